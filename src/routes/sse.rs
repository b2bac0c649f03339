use axum::{
    extract::State,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use chrono::Local;
use futures_util::stream::{self, StreamExt};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Interval, MissedTickBehavior};
use tokio_stream::wrappers::IntervalStream;

use crate::AppState;
use crate::charts::{ChartSpec, PALETTE, RollingSeries};
use crate::clients::BackendClient;
use crate::error::ApiError;
use crate::models::views::{DashboardCards, OverviewCards};
use crate::session::ApiSession;

const KEEP_ALIVE: Duration = Duration::from_secs(15);
const SAMPLES: usize = 12;

/// First tick fires immediately so the page fills in without waiting.
fn ticker(period: Duration) -> Interval {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Tells the page its session is gone; the script navigates to login.
fn expired_event() -> Event {
    Event::default().event("expired").data(json!({ "redirect": "/" }).to_string())
}

fn json_event(name: &str, payload: &impl serde::Serialize) -> Event {
    match serde_json::to_string(payload) {
        Ok(data) => Event::default().event(name).data(data),
        Err(e) => {
            tracing::error!("failed to encode {} event: {}", name, e);
            Event::default().comment("encode error")
        }
    }
}

async fn overview_event(backend: &BackendClient, token: &str) -> Event {
    match backend.overview_stats(token).await {
        Ok(stats) => json_event("overview", &OverviewCards::from_stats(&stats)),
        Err(e) if e.is_unauthorized() => expired_event(),
        Err(e) => {
            tracing::warn!("failed to refresh overview stats: {}", e);
            json_event("overview", &OverviewCards::unavailable())
        }
    }
}

/// Overview cards, re-sent every refresh interval.
pub async fn handle_home_stream(State(state): State<AppState>, session: ApiSession) -> Response {
    let backend = state.backend.clone();
    let token: Arc<str> = session.token.into();

    let stream = IntervalStream::new(ticker(state.config.refresh_interval())).then(move |_| {
        let backend = backend.clone();
        let token = token.clone();
        async move { Ok::<_, Infallible>(overview_event(&backend, &token).await) }
    });

    Sse::new(stream)
        .keep_alive(KeepAlive::default().interval(KEEP_ALIVE))
        .into_response()
}

/// Rolling CPU, memory and network samples of one dashboard stream.
struct DashboardSeries {
    cpu: RollingSeries,
    memory: RollingSeries,
    network: RollingSeries,
}

impl DashboardSeries {
    fn new() -> Self {
        Self {
            cpu: RollingSeries::new(SAMPLES),
            memory: RollingSeries::new(SAMPLES),
            network: RollingSeries::new(SAMPLES),
        }
    }

    fn charts(&self) -> Vec<ChartSpec> {
        vec![
            self.cpu.chart("cpuChart", "CPU (%)", PALETTE[0]),
            self.memory.chart("memoryChart", "Memory (%)", PALETTE[1]),
            self.network.chart("networkChart", "Network (MB)", PALETTE[2]),
        ]
    }
}

struct DashboardTick {
    backend: Arc<BackendClient>,
    token: String,
    interval: Interval,
    series: DashboardSeries,
}

async fn dashboard_event(tick: &mut DashboardTick) -> Event {
    let (stats, nodes) = tokio::join!(
        tick.backend.dashboard_stats(&tick.token),
        tick.backend.nodes(&tick.token),
    );
    if stats.as_ref().is_err_and(ApiError::is_unauthorized) || nodes.as_ref().is_err_and(ApiError::is_unauthorized) {
        return expired_event();
    }

    let stats = stats
        .map_err(|e| tracing::warn!("failed to refresh dashboard stats: {}", e))
        .ok();
    let nodes = nodes
        .map_err(|e| tracing::warn!("failed to refresh nodes: {}", e))
        .ok();

    if let Some(s) = &stats {
        let label = Local::now().format("%H:%M:%S").to_string();
        tick.series.cpu.push(label.clone(), s.resources.avg_cpu);
        tick.series.memory.push(label.clone(), s.resources.avg_memory);
        tick.series.network.push(label, s.resources.network_traffic);
    }

    json_event(
        "dashboard",
        &json!({
            "cards": DashboardCards::build(stats.as_ref(), nodes.as_deref()),
            "charts": tick.series.charts(),
        }),
    )
}

/// Dashboard cards plus the rolling charts fed from each sample.
pub async fn handle_dashboard_stream(State(state): State<AppState>, session: ApiSession) -> Response {
    let start = DashboardTick {
        backend: state.backend.clone(),
        token: session.token,
        interval: ticker(state.config.refresh_interval()),
        series: DashboardSeries::new(),
    };

    let stream = stream::unfold(start, |mut tick| async move {
        tick.interval.tick().await;
        let event = dashboard_event(&mut tick).await;
        Some((Ok::<_, Infallible>(event), tick))
    });

    Sse::new(stream)
        .keep_alive(KeepAlive::default().interval(KEEP_ALIVE))
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_charts_keep_twelve_samples() {
        let mut series = DashboardSeries::new();
        for i in 0..20 {
            series.cpu.push(format!("t{}", i), i as f64);
        }
        let charts = series.charts();
        assert_eq!(charts.len(), 3);
        assert_eq!(charts[0].canvas_id, "cpuChart");
        assert_eq!(charts[0].data.labels.len(), SAMPLES);
        assert_eq!(charts[0].data.labels[0], "t8");
        assert_eq!(charts[1].canvas_id, "memoryChart");
        assert_eq!(charts[2].canvas_id, "networkChart");
    }
}
