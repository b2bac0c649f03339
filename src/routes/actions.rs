use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::fragments::{AlertRowsFragment, LogEntriesFragment, RuleRowsFragment, log_region};
use super::ui::{alert_rows, render_html, rule_rows};
use super::{ViewQuery, page_view, session_expired, toast};
use crate::AppState;
use crate::filters::LogFilter;
use crate::forms::{FieldErrors, RuleForm, UserForm};
use crate::page::Page;
use crate::session::ApiSession;
use crate::state::alerts::Undo;

fn invalid(errors: FieldErrors) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "ok": false, "errors": errors.0 })),
    )
        .into_response()
}

// --- Local alert resolve ---

pub async fn handle_hide_alert(
    State(state): State<AppState>,
    session: ApiSession,
    Path(id): Path<String>,
    Query(q): Query<ViewQuery>,
) -> Response {
    let view = match page_view(&state, q.view, Page::Alerts, &session.token).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match view.with_data(|d| d.alerts.resolve(&id)) {
        Ok(()) => Json(json!({
            "ok": true,
            "alert_id": id,
            "message": "Alert resolved. Press Ctrl+Z to undo.",
        }))
        .into_response(),
        Err(e) => toast(false, e.to_string()),
    }
}

pub async fn handle_show_alert(
    State(state): State<AppState>,
    session: ApiSession,
    Path(id): Path<String>,
    Query(q): Query<ViewQuery>,
) -> Response {
    let view = match page_view(&state, q.view, Page::Alerts, &session.token).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let shown = view.with_data(|d| d.alerts.unresolve(&id));
    Json(json!({ "ok": shown, "alert_id": id })).into_response()
}

pub async fn handle_undo(
    State(state): State<AppState>,
    session: ApiSession,
    Query(q): Query<ViewQuery>,
) -> Response {
    let view = match page_view(&state, q.view, Page::Alerts, &session.token).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match view.with_data(|d| d.alerts.undo()) {
        Undo::Restored(id) => Json(json!({
            "ok": true,
            "restored": id,
            "message": "Alert restored.",
        }))
        .into_response(),
        Undo::Stale(id) => {
            tracing::debug!("undo entry for {} was already shown again", id);
            toast(false, "Alert is already visible.")
        }
        Undo::Empty => toast(false, "Nothing to restore."),
    }
}

// --- Backend resolve ---

pub async fn handle_resolve_alert(
    State(state): State<AppState>,
    session: ApiSession,
    Path(id): Path<String>,
    Query(q): Query<ViewQuery>,
) -> Response {
    let view = match page_view(&state, q.view, Page::Alerts, &session.token).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(e) = state.backend.resolve_alert(&session.token, &id).await {
        if e.is_unauthorized() {
            return session_expired(&state);
        }
        tracing::warn!("failed to resolve alert {}: {}", id, e);
        return toast(false, e.user_message("Failed to resolve alert."));
    }
    tracing::info!("resolved alert {}", id);

    let list = match state.backend.alerts(&session.token).await {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!("failed to reload alerts: {}", e);
            return toast(true, "Alert resolved.");
        }
    };
    let (summary, alerts) = view.with_data(|d| {
        d.alerts.load(list);
        (d.alerts.summary(), alert_rows(&d.alerts))
    });
    let html = match render_html(&AlertRowsFragment { alerts }) {
        Ok(html) => html,
        Err(resp) => return resp,
    };
    Json(json!({
        "ok": true,
        "message": "Alert resolved.",
        "html": html,
        "summary": summary,
    }))
    .into_response()
}

// --- Alert rules ---

pub async fn handle_update_rule(
    State(state): State<AppState>,
    session: ApiSession,
    Path(id): Path<String>,
    Query(q): Query<ViewQuery>,
    Form(form): Form<RuleForm>,
) -> Response {
    let view = match page_view(&state, q.view, Page::Alerts, &session.token).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let update = match form.validate() {
        Ok(update) => update,
        Err(errors) => return invalid(errors),
    };
    if let Err(e) = state.backend.update_alert_rule(&session.token, &id, &update).await {
        if e.is_unauthorized() {
            return session_expired(&state);
        }
        tracing::warn!("failed to update alert rule {}: {}", id, e);
        return toast(false, e.user_message("Failed to update alert rule."));
    }

    let rules = view.with_data(|d| {
        if let Some(rule) = d.rules.iter_mut().find(|r| r.id == id) {
            rule.name = update.name;
            rule.target = update.target;
            rule.condition = update.condition;
            rule.severity = update.severity;
            rule.status = update.status;
        }
        rule_rows(&d.rules)
    });
    match render_html(&RuleRowsFragment { rules }) {
        Ok(html) => Json(json!({ "ok": true, "message": "Alert rule updated.", "html": html })).into_response(),
        Err(resp) => resp,
    }
}

pub async fn handle_delete_rule(
    State(state): State<AppState>,
    session: ApiSession,
    Path(id): Path<String>,
    Query(q): Query<ViewQuery>,
) -> Response {
    let view = match page_view(&state, q.view, Page::Alerts, &session.token).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(e) = state.backend.delete_alert_rule(&session.token, &id).await {
        if e.is_unauthorized() {
            return session_expired(&state);
        }
        tracing::warn!("failed to delete alert rule {}: {}", id, e);
        return toast(false, e.user_message("Failed to delete alert rule."));
    }

    let rules = view.with_data(|d| {
        d.rules.retain(|r| r.id != id);
        rule_rows(&d.rules)
    });
    match render_html(&RuleRowsFragment { rules }) {
        Ok(html) => Json(json!({ "ok": true, "message": "Alert rule deleted.", "html": html })).into_response(),
        Err(resp) => resp,
    }
}

// --- Logs ---

pub async fn handle_clear_logs(
    State(state): State<AppState>,
    session: ApiSession,
    Query(q): Query<ViewQuery>,
) -> Response {
    let view = match page_view(&state, q.view, Page::Logs, &session.token).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(e) = state.backend.clear_logs(&session.token).await {
        if e.is_unauthorized() {
            return session_expired(&state);
        }
        tracing::warn!("failed to clear logs: {}", e);
        return toast(false, e.user_message("Failed to clear logs."));
    }
    tracing::info!("cleared all logs");

    let region = view.with_data(|d| {
        d.logs.clear();
        log_region(&d.logs, &LogFilter::default(), false)
    });
    let stats = match state.backend.log_stats(&session.token, "24h").await {
        Ok(stats) => Some(stats),
        Err(e) => {
            tracing::warn!("failed to reload log stats: {}", e);
            None
        }
    };
    let html = match render_html(&LogEntriesFragment { region: &region }) {
        Ok(html) => html,
        Err(resp) => return resp,
    };
    Json(json!({
        "ok": true,
        "message": "All logs cleared.",
        "stats": stats,
        "html": html,
    }))
    .into_response()
}

// --- Users ---

pub async fn handle_save_user(
    State(state): State<AppState>,
    session: ApiSession,
    Form(form): Form<UserForm>,
) -> Response {
    let payload = match form.validate() {
        Ok(payload) => payload,
        Err(errors) => return invalid(errors),
    };
    let (result, done) = if form.is_new() {
        (
            state.backend.create_user(&session.token, &payload).await,
            "User created.",
        )
    } else {
        (
            state
                .backend
                .update_user(&session.token, form.user_id.trim(), &payload)
                .await,
            "User updated.",
        )
    };
    match result {
        Ok(_) => {
            tracing::info!("saved user {}", payload.username);
            toast(true, done)
        }
        Err(e) if e.is_unauthorized() => session_expired(&state),
        Err(e) => {
            tracing::warn!("failed to save user {}: {}", payload.username, e);
            toast(false, e.user_message("Failed to save user."))
        }
    }
}

pub async fn handle_delete_user(
    State(state): State<AppState>,
    session: ApiSession,
    Path(id): Path<String>,
) -> Response {
    match state.backend.delete_user(&session.token, &id).await {
        Ok(_) => {
            tracing::info!("deleted user {}", id);
            toast(true, "User deleted.")
        }
        Err(e) if e.is_unauthorized() => session_expired(&state),
        Err(e) => {
            tracing::warn!("failed to delete user {}: {}", id, e);
            toast(false, e.user_message("Failed to delete user."))
        }
    }
}
