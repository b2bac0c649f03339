pub mod actions;
pub mod auth;
pub mod data;
pub mod fragments;
pub mod sse;
pub mod ui;

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::AppState;
use crate::page::Page;
use crate::session::{self, SessionExpired};
use crate::state::PageView;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Session
        .route("/", get(ui::handle_login_page))
        .route("/login", post(auth::handle_login))
        .route("/logout", post(auth::handle_logout))
        .route("/session/heartbeat", post(auth::handle_heartbeat))
        // Pages
        .route("/{page}", get(ui::handle_page))
        .route("/containers/{id}", get(ui::handle_container_detail))
        .route("/nodes/{name}", get(ui::handle_node_detail))
        // Fragments
        .route("/fragments/containers", get(fragments::handle_containers))
        .route("/fragments/alerts", get(fragments::handle_alerts))
        .route("/fragments/alerts/{id}/detail", get(fragments::handle_alert_detail))
        .route("/fragments/alert-rules", get(fragments::handle_alert_rules))
        .route("/fragments/events", get(fragments::handle_events))
        .route("/fragments/logs", get(fragments::handle_logs))
        .route("/fragments/users", get(fragments::handle_users))
        .route("/fragments/admin-stats", get(fragments::handle_admin_stats))
        // Actions
        .route("/actions/alerts/undo", post(actions::handle_undo))
        .route("/actions/alerts/{id}/hide", post(actions::handle_hide_alert))
        .route("/actions/alerts/{id}/show", post(actions::handle_show_alert))
        .route("/actions/alerts/{id}/resolve", post(actions::handle_resolve_alert))
        .route("/actions/alert-rules/{id}", post(actions::handle_update_rule))
        .route("/actions/alert-rules/{id}/delete", post(actions::handle_delete_rule))
        .route("/actions/logs/clear", post(actions::handle_clear_logs))
        .route("/actions/users", post(actions::handle_save_user))
        .route("/actions/users/{id}/delete", post(actions::handle_delete_user))
        // Chart data and exports
        .route("/data/monitoring", get(data::handle_monitoring_charts))
        .route("/data/nodes", get(data::handle_node_charts))
        .route("/data/nodes/{name}/stats", get(data::handle_node_stats_chart))
        .route("/data/alerts", get(data::handle_alert_charts))
        .route("/data/events", get(data::handle_event_charts))
        .route("/logs/export.csv", get(data::handle_logs_export))
        // Live stats
        .route("/stream/home", get(sse::handle_home_stream))
        .route("/stream/dashboard", get(sse::handle_dashboard_stream))
        // Health
        .route("/healthz", get(|| async { "ok" }))
        // Static files
        .nest_service("/static", ServeDir::new("static"))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `?view=<id>` carried by every script request of a page.
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub view: Option<Uuid>,
}

/// The page view a script request belongs to. A missing or expired view
/// answers 410 and the script reloads the page.
pub(crate) async fn page_view(
    state: &AppState,
    view: Option<Uuid>,
    page: Page,
    token: &str,
) -> Result<Arc<PageView>, Response> {
    let found = match view {
        Some(id) => state.views.get(id, page, token).await,
        None => None,
    };
    found.ok_or_else(|| {
        (StatusCode::GONE, Json(json!({ "reload": true }))).into_response()
    })
}

/// The backend rejected the token: drop both token cookies and send the
/// script to the login page.
pub(crate) fn session_expired(state: &AppState) -> Response {
    let mut headers = HeaderMap::new();
    session::set_cookies(&mut headers, session::clear_tokens(&state.cookies()));
    (headers, SessionExpired).into_response()
}

/// Toast payload for script actions.
pub(crate) fn toast(ok: bool, message: impl Into<String>) -> Response {
    Json(json!({ "ok": ok, "message": message.into() })).into_response()
}

/// A newer response for the same region has already been rendered.
pub(crate) fn superseded() -> Response {
    StatusCode::NO_CONTENT.into_response()
}
