use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Local;
use serde_json::json;

use super::ui::{now_local, now_utc};
use super::{ViewQuery, page_view, session_expired};
use crate::AppState;
use crate::charts::{
    ChartKind, ChartSpec, alert_trend, event_trend, event_types, line_or_fallback, node_usage_chart,
    status_or_fallback,
};
use crate::filters::{LogFilter, LogFilterQuery};
use crate::helpers::local_datetime;
use crate::models::api::LogEntry;
use crate::page::Page;
use crate::session::ApiSession;

fn charts_json(charts: Vec<ChartSpec>) -> Response {
    let simulated = charts.iter().any(|c| c.simulated);
    Json(json!({ "charts": charts, "simulated": simulated })).into_response()
}

pub async fn handle_monitoring_charts(State(state): State<AppState>, session: ApiSession) -> Response {
    let token = session.token.as_str();
    let (traffic, disk, response, status) = tokio::join!(
        state.backend.network_traffic(token),
        state.backend.disk_io(token),
        state.backend.response_time(token),
        state.backend.request_status(token),
    );
    let rejected = traffic.as_ref().is_err_and(|e| e.is_unauthorized())
        || disk.as_ref().is_err_and(|e| e.is_unauthorized())
        || response.as_ref().is_err_and(|e| e.is_unauthorized())
        || status.as_ref().is_err_and(|e| e.is_unauthorized());
    if rejected {
        return session_expired(&state);
    }

    let simulate = state.config.simulate_on_failure;
    charts_json(vec![
        line_or_fallback("networkTrafficChart", traffic, simulate, &["Inbound", "Outbound"], (10.0, 100.0)),
        line_or_fallback("diskIoChart", disk, simulate, &["Read", "Write"], (5.0, 50.0)),
        line_or_fallback("responseTimeChart", response, simulate, &["Response time"], (50.0, 300.0)),
        status_or_fallback("requestStatusChart", status, simulate),
    ])
}

pub async fn handle_node_charts(State(state): State<AppState>, session: ApiSession) -> Response {
    match state.backend.nodes(&session.token).await {
        Ok(nodes) => charts_json(vec![
            node_usage_chart("nodeCpuChart", "CPU usage (%)", &nodes, |n| n.cpu.usage),
            node_usage_chart("nodeMemoryChart", "Memory usage (%)", &nodes, |n| n.memory.usage),
        ]),
        Err(e) if e.is_unauthorized() => session_expired(&state),
        Err(e) => {
            tracing::warn!("failed to load node charts: {}", e);
            charts_json(vec![
                ChartSpec::unavailable("nodeCpuChart", ChartKind::Bar),
                ChartSpec::unavailable("nodeMemoryChart", ChartKind::Bar),
            ])
        }
    }
}

pub async fn handle_node_stats_chart(
    State(state): State<AppState>,
    session: ApiSession,
    Path(name): Path<String>,
) -> Response {
    let result = state.backend.node_stats(&session.token, &name).await;
    if result.as_ref().is_err_and(|e| e.is_unauthorized()) {
        return session_expired(&state);
    }
    charts_json(vec![line_or_fallback(
        "nodeStatsChart",
        result,
        state.config.simulate_on_failure,
        &["CPU", "Memory"],
        (0.0, 100.0),
    )])
}

pub async fn handle_alert_charts(
    State(state): State<AppState>,
    session: ApiSession,
    Query(q): Query<ViewQuery>,
) -> Response {
    let view = match page_view(&state, q.view, Page::Alerts, &session.token).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let today = Local::now().date_naive();
    let chart = view.with_data(|d| alert_trend(d.alerts.alerts(), today));
    charts_json(vec![chart])
}

pub async fn handle_event_charts(
    State(state): State<AppState>,
    session: ApiSession,
    Query(q): Query<ViewQuery>,
) -> Response {
    let view = match page_view(&state, q.view, Page::Events, &session.token).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let now = now_local();
    let charts = view.with_data(|d| {
        if d.events.is_empty() {
            vec![
                ChartSpec::unavailable("eventTrendChart", ChartKind::Line),
                ChartSpec::unavailable("eventTypeChart", ChartKind::Doughnut),
            ]
        } else {
            vec![event_trend(&d.events, now), event_types(&d.events)]
        }
    });
    charts_json(charts)
}

// --- CSV export ---

fn csv_field(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// UTF-8 BOM, quoted header, one quoted row per entry.
pub(crate) fn logs_csv(entries: &[&LogEntry]) -> String {
    let mut out = String::from("\u{feff}");
    out.push_str("\"Time\",\"Level\",\"Message\"\n");
    for e in entries {
        out.push_str(&csv_field(&local_datetime(&e.timestamp)));
        out.push(',');
        out.push_str(&csv_field(&e.level.to_uppercase()));
        out.push(',');
        out.push_str(&csv_field(&e.message));
        out.push('\n');
    }
    out
}

pub async fn handle_logs_export(
    State(state): State<AppState>,
    session: ApiSession,
    Query(q): Query<ViewQuery>,
    Query(filter_q): Query<LogFilterQuery>,
) -> Response {
    let view = match page_view(&state, q.view, Page::Logs, &session.token).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let filter = LogFilter::from_query(&filter_q);
    let body = view.with_data(|d| logs_csv(&filter.apply(&d.logs, now_utc())));
    let filename = format!("logs_export_{}.csv", Local::now().format("%Y-%m-%dT%H-%M-%S"));

    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_quotes_and_doubles() {
        let entries = [
            LogEntry {
                timestamp: "not a time".into(),
                level: "warn".into(),
                message: "said \"hi\", then left".into(),
                ..Default::default()
            },
        ];
        let refs: Vec<&LogEntry> = entries.iter().collect();
        let csv = logs_csv(&refs);
        assert!(csv.starts_with('\u{feff}'));
        let lines: Vec<&str> = csv.trim_start_matches('\u{feff}').lines().collect();
        assert_eq!(lines[0], "\"Time\",\"Level\",\"Message\"");
        assert_eq!(lines[1], "\"not a time\",\"WARN\",\"said \"\"hi\"\", then left\"");
    }

    #[test]
    fn empty_export_has_header_only() {
        let csv = logs_csv(&[]);
        assert_eq!(csv.lines().count(), 1);
    }
}
