use askama::Template;
use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::ui::{
    alert_rows, build_detail_view, build_event_row, build_log_row, container_page, now_local, now_utc, render_html,
    render_template, rule_rows, user_page,
};
use super::{page_view, session_expired, superseded};
use crate::AppState;
use crate::clients::logs::LogQuery;
use crate::filters::{EventFilter, EventQuery, LogFilter, LogFilterQuery, namespace_options, search_stats};
use crate::models::api::{AdminStats, AlertDetail, AlertSummary, Event, LogEntry};
use crate::models::views::{AlertDetailView, AlertRow, ContainerRow, EventRow, Listing, LogRow, RuleRow, UserRow};
use crate::page::Page;
use crate::pagination::Pager;
use crate::session::ApiSession;
use crate::state::sequencer::Resource;

/// Query shared by fragment requests.
#[derive(Debug, Default, Deserialize)]
pub struct FragmentQuery {
    #[serde(default)]
    pub view: Option<Uuid>,
    #[serde(default)]
    pub page: Option<u32>,
    /// Set to refetch from the backend instead of re-rendering the cache.
    #[serde(default)]
    pub refresh: Option<String>,
}

impl FragmentQuery {
    fn refresh(&self) -> bool {
        self.refresh.as_deref().is_some_and(|v| !v.is_empty() && v != "0")
    }

    fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}

// --- Containers ---

#[derive(Template)]
#[template(path = "fragments/containers.html")]
struct ContainersFragment {
    containers: Listing<ContainerRow>,
    pager: Pager,
}

pub async fn handle_containers(
    State(state): State<AppState>,
    session: ApiSession,
    Query(q): Query<FragmentQuery>,
) -> Response {
    let view = match page_view(&state, q.view, Page::Containers, &session.token).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let ticket = view.sequencer.issue(Resource::Containers);
    let (containers, pager) = container_page(&state, &session.token, q.page()).await;
    if !view.sequencer.commit(ticket) {
        return superseded();
    }
    render_template(&ContainersFragment { containers, pager })
}

// --- Alerts ---

#[derive(Template)]
#[template(path = "fragments/alerts_rows.html")]
pub(crate) struct AlertRowsFragment {
    pub alerts: Listing<AlertRow>,
}

pub async fn handle_alerts(
    State(state): State<AppState>,
    session: ApiSession,
    Query(q): Query<FragmentQuery>,
) -> Response {
    let view = match page_view(&state, q.view, Page::Alerts, &session.token).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let ticket = view.sequencer.issue(Resource::Alerts);
    let fetched = if q.refresh() {
        match state.backend.alerts(&session.token).await {
            Ok(list) => Some(list),
            Err(e) if e.is_unauthorized() => return session_expired(&state),
            Err(e) => {
                tracing::warn!("failed to refresh alerts: {}", e);
                return Json(json!({ "ok": false, "message": e.user_message("Failed to load alerts.") }))
                    .into_response();
            }
        }
    } else {
        None
    };
    if !view.sequencer.commit(ticket) {
        return superseded();
    }

    let (summary, alerts): (AlertSummary, _) = view.with_data(|d| {
        if let Some(list) = fetched {
            d.alerts.load(list);
        }
        (d.alerts.summary(), alert_rows(&d.alerts))
    });
    let html = match render_html(&AlertRowsFragment { alerts }) {
        Ok(html) => html,
        Err(resp) => return resp,
    };
    Json(json!({ "ok": true, "html": html, "summary": summary })).into_response()
}

#[derive(Template)]
#[template(path = "fragments/alert_detail.html")]
struct AlertDetailFragment {
    detail: Option<AlertDetailView>,
}

pub async fn handle_alert_detail(
    State(state): State<AppState>,
    session: ApiSession,
    Path(id): Path<String>,
) -> Response {
    let detail = match state.backend.alert_detail(&session.token, &id).await {
        Ok(d) => Ok(d),
        Err(e) if e.is_unauthorized() => return session_expired(&state),
        Err(e) => {
            // older backends only serve the plain alert
            tracing::warn!("failed to load alert detail {}: {}", id, e);
            state.backend.alert(&session.token, &id).await.map(AlertDetail::from)
        }
    };
    let detail = match detail {
        Ok(d) => Some(build_detail_view(&d)),
        Err(e) if e.is_unauthorized() => return session_expired(&state),
        Err(e) => {
            tracing::warn!("failed to load alert {}: {}", id, e);
            None
        }
    };
    render_template(&AlertDetailFragment { detail })
}

#[derive(Template)]
#[template(path = "fragments/alert_rules_rows.html")]
pub(crate) struct RuleRowsFragment {
    pub rules: Listing<RuleRow>,
}

pub async fn handle_alert_rules(
    State(state): State<AppState>,
    session: ApiSession,
    Query(q): Query<FragmentQuery>,
) -> Response {
    let view = match page_view(&state, q.view, Page::Alerts, &session.token).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let ticket = view.sequencer.issue(Resource::AlertRules);
    let fetched = if q.refresh() {
        match state.backend.alert_rules(&session.token).await {
            Ok(rules) => Some(rules),
            Err(e) if e.is_unauthorized() => return session_expired(&state),
            Err(e) => {
                tracing::warn!("failed to refresh alert rules: {}", e);
                return render_template(&RuleRowsFragment { rules: Listing::Failed });
            }
        }
    } else {
        None
    };
    if !view.sequencer.commit(ticket) {
        return superseded();
    }
    let rules = view.with_data(|d| {
        if let Some(rules) = fetched {
            d.rules = rules;
        }
        rule_rows(&d.rules)
    });
    render_template(&RuleRowsFragment { rules })
}

// --- Events ---

/// Rendered events table plus the state of the filter bar around it.
#[derive(Debug, Clone)]
pub struct EventRegion {
    pub rows: Listing<EventRow>,
    pub empty_text: &'static str,
    pub namespaces: Vec<String>,
    pub selected: String,
    pub stats: Option<String>,
}

/// Filter the cached events. A namespace that is no longer offered resets
/// to "all" before filtering.
pub(crate) fn event_region(events: &[Event], filter: &EventFilter, namespace: &str, failed: bool) -> EventRegion {
    let now = now_local();
    let (namespaces, selected) = namespace_options(events, namespace);
    let mut filter = filter.clone();
    if selected.is_empty() {
        filter.namespace = None;
    }

    let matched = filter.apply(events, now);
    let stats = (!filter.search.is_empty()).then(|| search_stats(&filter.search, matched.len(), events.len()));
    let rows = if failed {
        Listing::Failed
    } else {
        Listing::from_rows(
            matched
                .into_iter()
                .map(|e| build_event_row(e, &filter.search, now))
                .collect(),
        )
    };
    EventRegion {
        rows,
        empty_text: if events.is_empty() {
            "No events."
        } else {
            "No events match the current filters."
        },
        namespaces,
        selected,
        stats,
    }
}

#[derive(Template)]
#[template(path = "fragments/events_rows.html")]
struct EventRowsFragment<'a> {
    region: &'a EventRegion,
}

pub async fn handle_events(
    State(state): State<AppState>,
    session: ApiSession,
    Query(q): Query<FragmentQuery>,
    Query(filter_q): Query<EventQuery>,
) -> Response {
    let view = match page_view(&state, q.view, Page::Events, &session.token).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let ticket = view.sequencer.issue(Resource::Events);
    let mut failed = false;
    let fetched = if q.refresh() {
        match state.backend.events(&session.token).await {
            Ok(list) => Some(list.events),
            Err(e) if e.is_unauthorized() => return session_expired(&state),
            Err(e) => {
                tracing::warn!("failed to refresh events: {}", e);
                failed = true;
                None
            }
        }
    } else {
        None
    };
    if !view.sequencer.commit(ticket) {
        return superseded();
    }

    let filter = EventFilter::from_query(&filter_q);
    let region = view.with_data(|d| {
        if let Some(events) = fetched {
            d.events = events;
        }
        event_region(&d.events, &filter, &filter_q.namespace, failed)
    });
    let html = match render_html(&EventRowsFragment { region: &region }) {
        Ok(html) => html,
        Err(resp) => return resp,
    };
    Json(json!({
        "html": html,
        "namespaces": region.namespaces,
        "selected": region.selected,
        "stats": region.stats,
    }))
    .into_response()
}

// --- Logs ---

#[derive(Debug, Clone)]
pub struct LogRegion {
    pub rows: Listing<LogRow>,
    pub empty_text: &'static str,
    pub count: usize,
}

pub(crate) fn log_region(entries: &[LogEntry], filter: &LogFilter, failed: bool) -> LogRegion {
    let matched = filter.apply(entries, now_utc());
    let count = matched.len();
    let rows = if failed {
        Listing::Failed
    } else {
        Listing::from_rows(matched.into_iter().map(build_log_row).collect())
    };
    LogRegion {
        rows,
        empty_text: if entries.is_empty() {
            "No logs."
        } else {
            "No logs match the current filters."
        },
        count,
    }
}

#[derive(Template)]
#[template(path = "fragments/log_entries.html")]
pub(crate) struct LogEntriesFragment<'a> {
    pub region: &'a LogRegion,
}

pub async fn handle_logs(
    State(state): State<AppState>,
    session: ApiSession,
    Query(q): Query<FragmentQuery>,
    Query(filter_q): Query<LogFilterQuery>,
) -> Response {
    let view = match page_view(&state, q.view, Page::Logs, &session.token).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let ticket = view.sequencer.issue(Resource::Logs);
    let mut failed = false;
    let fetched = if q.refresh() {
        // level and range narrow the server query too; search stays local
        let query = LogQuery {
            level: filter_q.level.trim().to_uppercase(),
            container_id: filter_q.container.trim().to_string(),
            time_range: filter_q.range.trim().to_string(),
            ..Default::default()
        };
        match state.backend.logs(&session.token, &query).await {
            Ok(list) => Some(list.logs),
            Err(e) if e.is_unauthorized() => return session_expired(&state),
            Err(e) => {
                tracing::warn!("failed to refresh logs: {}", e);
                failed = true;
                None
            }
        }
    } else {
        None
    };
    if !view.sequencer.commit(ticket) {
        return superseded();
    }

    let filter = LogFilter::from_query(&filter_q);
    let region = view.with_data(|d| {
        if let Some(logs) = fetched {
            d.logs = logs;
        }
        log_region(&d.logs, &filter, failed)
    });
    let html = match render_html(&LogEntriesFragment { region: &region }) {
        Ok(html) => html,
        Err(resp) => return resp,
    };
    Json(json!({ "html": html, "count": region.count })).into_response()
}

// --- Admin ---

#[derive(Template)]
#[template(path = "fragments/users.html")]
struct UsersFragment {
    users: Listing<UserRow>,
    pager: Pager,
}

pub async fn handle_users(
    State(state): State<AppState>,
    session: ApiSession,
    Query(q): Query<FragmentQuery>,
) -> Response {
    let view = match page_view(&state, q.view, Page::Admin, &session.token).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let ticket = view.sequencer.issue(Resource::Users);
    let (users, pager) = user_page(&state, &session.token, q.page()).await;
    if !view.sequencer.commit(ticket) {
        return superseded();
    }
    render_template(&UsersFragment { users, pager })
}

#[derive(Template)]
#[template(path = "fragments/admin_stats.html")]
struct AdminStatsFragment {
    stats: Option<AdminStats>,
}

pub async fn handle_admin_stats(
    State(state): State<AppState>,
    session: ApiSession,
    Query(q): Query<FragmentQuery>,
) -> Response {
    let view = match page_view(&state, q.view, Page::Admin, &session.token).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let ticket = view.sequencer.issue(Resource::Stats);
    let stats = match state.backend.admin_stats(&session.token).await {
        Ok(stats) => Some(stats),
        Err(e) if e.is_unauthorized() => return session_expired(&state),
        Err(e) => {
            tracing::warn!("failed to load admin stats: {}", e);
            None
        }
    };
    if !view.sequencer.commit(ticket) {
        return superseded();
    }
    render_template(&AdminStatsFragment { stats })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: &str, ns: &str, msg: &str) -> Event {
        Event {
            kind: kind.into(),
            namespace: ns.into(),
            message: msg.into(),
            time: "00:00:00".into(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_text_depends_on_cache() {
        let region = event_region(&[], &EventFilter::default(), "", false);
        assert!(region.rows.is_empty_state());
        assert_eq!(region.empty_text, "No events.");

        let events = vec![event("Normal", "web", "pulled")];
        let filter = EventFilter {
            kind: Some("Warning".into()),
            ..Default::default()
        };
        let region = event_region(&events, &filter, "", false);
        assert!(region.rows.is_empty_state());
        assert_eq!(region.empty_text, "No events match the current filters.");
    }

    #[test]
    fn stale_namespace_resets_to_all() {
        let events = vec![event("Normal", "web", "a"), event("Warning", "db", "b")];
        let filter = EventFilter {
            namespace: Some("gone".into()),
            ..Default::default()
        };
        let region = event_region(&events, &filter, "gone", false);
        assert_eq!(region.selected, "");
        assert_eq!(region.namespaces, vec!["db", "web"]);
        assert_eq!(region.rows.rows().len(), 2);
    }

    #[test]
    fn search_reports_stats_and_highlights() {
        let events = vec![event("Normal", "web", "Pulled image"), event("Normal", "web", "Started")];
        let filter = EventFilter {
            search: "pull".into(),
            ..Default::default()
        };
        let region = event_region(&events, &filter, "", false);
        assert_eq!(region.rows.rows().len(), 1);
        assert_eq!(region.stats.as_deref(), Some("\"pull\" results: 1 (of 2, 50.0%)"));
        assert_eq!(
            region.rows.rows()[0].message.to_string(),
            "<mark class=\"search-highlight\">Pull</mark>ed image"
        );
    }

    #[test]
    fn failed_fetch_wins_over_cache() {
        let events = vec![event("Normal", "web", "a")];
        let region = event_region(&events, &EventFilter::default(), "", true);
        assert!(region.rows.is_failed());
    }

    #[test]
    fn log_region_counts_matches() {
        let entries = vec![
            LogEntry {
                level: "ERROR".into(),
                message: "disk full".into(),
                ..Default::default()
            },
            LogEntry {
                level: "info".into(),
                message: "ok".into(),
                ..Default::default()
            },
        ];
        let filter = LogFilter {
            level: Some("error".into()),
            ..Default::default()
        };
        let region = log_region(&entries, &filter, false);
        assert_eq!(region.count, 1);
        assert_eq!(region.rows.rows()[0].level, "ERROR");
        assert_eq!(region.rows.rows()[0].level_class, "error");
    }
}
