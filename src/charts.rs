use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

use crate::error::ApiError;
use crate::filters::event_time;
use crate::helpers::{parse_timestamp, usage_rgba};
use crate::models::api::{Alert, Event, LineSeries, Node, StatusDistribution};

pub const UNAVAILABLE: &str = "Data unavailable.";

pub(crate) const PALETTE: [(&str, &str); 4] = [
    ("#4CAF50", "rgba(76, 175, 80, 0.1)"),
    ("#2196F3", "rgba(33, 150, 243, 0.1)"),
    ("#FF9800", "rgba(255, 152, 0, 0.1)"),
    ("#9C27B0", "rgba(156, 39, 176, 0.1)"),
];

const STATUS_COLORS: [&str; 4] = ["#4CAF50", "#2196F3", "#FF9800", "#F44336"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Doughnut,
}

/// One color for the whole dataset, or one per point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Paint {
    One(String),
    Each(Vec<String>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSpec {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
    pub data: Vec<f64>,
    pub border_color: Paint,
    pub background_color: Paint,
    pub border_width: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_radius: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_hover_radius: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
}

impl DatasetSpec {
    fn line(label: &str, data: Vec<f64>, border: &str, background: &str) -> Self {
        Self {
            label: label.to_string(),
            data,
            border_color: Paint::One(border.to_string()),
            background_color: Paint::One(background.to_string()),
            border_width: 2,
            point_radius: Some(4),
            point_hover_radius: Some(6),
            tension: Some(0.1),
            fill: Some(false),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<DatasetSpec>,
}

/// Everything the browser needs to draw one canvas.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub canvas_id: String,
    pub kind: ChartKind,
    pub data: ChartData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_max: Option<f64>,
    /// Generated locally because the backend series could not be fetched.
    pub simulated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ChartSpec {
    pub fn new(canvas_id: &str, kind: ChartKind, data: ChartData) -> Self {
        Self {
            canvas_id: canvas_id.to_string(),
            kind,
            data,
            y_max: None,
            simulated: false,
            message: None,
        }
    }

    pub fn unavailable(canvas_id: &str, kind: ChartKind) -> Self {
        Self {
            message: Some(UNAVAILABLE.to_string()),
            ..Self::new(canvas_id, kind, ChartData::default())
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.message.is_some()
    }
}

/// Backend line series with the console's default styling for datasets that
/// carry no colors of their own.
pub fn line_chart(canvas_id: &str, series: &LineSeries) -> ChartSpec {
    let datasets = series
        .datasets
        .iter()
        .enumerate()
        .map(|(i, ds)| {
            let (border, background) = PALETTE[i % PALETTE.len()];
            DatasetSpec::line(
                &ds.label,
                ds.data.clone(),
                ds.border_color.as_deref().unwrap_or(border),
                ds.background_color.as_deref().unwrap_or(background),
            )
        })
        .collect();
    ChartSpec::new(
        canvas_id,
        ChartKind::Line,
        ChartData {
            labels: series.labels.clone(),
            datasets,
        },
    )
}

pub fn status_doughnut(canvas_id: &str, dist: &StatusDistribution) -> ChartSpec {
    let colors: Vec<String> = (0..dist.labels.len())
        .map(|i| STATUS_COLORS[i % STATUS_COLORS.len()].to_string())
        .collect();
    doughnut(canvas_id, dist.labels.clone(), dist.values().to_vec(), colors, "#ffffff")
}

fn doughnut(canvas_id: &str, labels: Vec<String>, values: Vec<f64>, colors: Vec<String>, border: &str) -> ChartSpec {
    let n = colors.len();
    ChartSpec::new(
        canvas_id,
        ChartKind::Doughnut,
        ChartData {
            labels,
            datasets: vec![DatasetSpec {
                label: String::new(),
                data: values,
                border_color: Paint::Each(vec![border.to_string(); n]),
                background_color: Paint::Each(colors),
                border_width: 2,
                point_radius: None,
                point_hover_radius: None,
                tension: None,
                fill: None,
            }],
        },
    )
}

/// Fetched line series, or what to show instead when the fetch failed.
pub fn line_or_fallback(
    canvas_id: &str,
    result: Result<LineSeries, ApiError>,
    simulate: bool,
    names: &[&str],
    range: (f64, f64),
) -> ChartSpec {
    match result {
        Ok(series) if !series.datasets.is_empty() => line_chart(canvas_id, &series),
        Ok(_) => ChartSpec::unavailable(canvas_id, ChartKind::Line),
        Err(e) => {
            tracing::warn!("chart {}: {}", canvas_id, e);
            if simulate {
                let mut spec = line_chart(canvas_id, &simulated_series(&mut rand::thread_rng(), names, range));
                spec.simulated = true;
                spec
            } else {
                ChartSpec::unavailable(canvas_id, ChartKind::Line)
            }
        }
    }
}

pub fn status_or_fallback(
    canvas_id: &str,
    result: Result<StatusDistribution, ApiError>,
    simulate: bool,
) -> ChartSpec {
    match result {
        Ok(dist) if !dist.values().is_empty() => status_doughnut(canvas_id, &dist),
        Ok(_) => ChartSpec::unavailable(canvas_id, ChartKind::Doughnut),
        Err(e) => {
            tracing::warn!("chart {}: {}", canvas_id, e);
            if simulate {
                let mut rng = rand::thread_rng();
                let dist = StatusDistribution {
                    labels: ["2xx", "3xx", "4xx", "5xx"].map(String::from).to_vec(),
                    data: vec![
                        rng.gen_range(60.0..80.0_f64).round(),
                        rng.gen_range(5.0..15.0_f64).round(),
                        rng.gen_range(5.0..15.0_f64).round(),
                        rng.gen_range(1.0..5.0_f64).round(),
                    ],
                    datasets: Vec::new(),
                };
                let mut spec = status_doughnut(canvas_id, &dist);
                spec.simulated = true;
                spec
            } else {
                ChartSpec::unavailable(canvas_id, ChartKind::Doughnut)
            }
        }
    }
}

/// Twelve hourly points per name, uniformly drawn from `range`.
pub fn simulated_series(rng: &mut impl Rng, names: &[&str], range: (f64, f64)) -> LineSeries {
    let now = chrono::Local::now().naive_local();
    let labels = (0..12)
        .rev()
        .map(|h| (now - Duration::hours(h)).format("%H:00").to_string())
        .collect();
    let datasets = names
        .iter()
        .map(|name| crate::models::api::SeriesDataset {
            label: name.to_string(),
            data: (0..12)
                .map(|_| (rng.gen_range(range.0..range.1) * 10.0_f64).round() / 10.0)
                .collect(),
            ..Default::default()
        })
        .collect();
    LineSeries { labels, datasets }
}

/// Bar chart of one usage percentage per node, colored by threshold.
pub fn node_usage_chart(canvas_id: &str, label: &str, nodes: &[Node], usage: impl Fn(&Node) -> f64) -> ChartSpec {
    let values: Vec<f64> = nodes.iter().map(&usage).collect();
    let mut spec = ChartSpec::new(
        canvas_id,
        ChartKind::Bar,
        ChartData {
            labels: nodes.iter().map(|n| n.name.clone()).collect(),
            datasets: vec![DatasetSpec {
                label: label.to_string(),
                background_color: Paint::Each(values.iter().map(|v| usage_rgba(*v, 0.8)).collect()),
                border_color: Paint::Each(values.iter().map(|v| usage_rgba(*v, 1.0)).collect()),
                data: values,
                border_width: 2,
                point_radius: None,
                point_hover_radius: None,
                tension: None,
                fill: None,
            }],
        },
    );
    spec.y_max = Some(100.0);
    spec
}

/// Critical/Warning/Info counts for the seven days ending `today`.
pub fn alert_trend(alerts: &[Alert], today: NaiveDate) -> ChartSpec {
    let days: Vec<NaiveDate> = (0..7).rev().map(|i| today - Duration::days(i)).collect();
    let count = |severity: &str| -> Vec<f64> {
        days.iter()
            .map(|day| {
                alerts
                    .iter()
                    .filter(|a| a.severity == severity)
                    .filter(|a| parse_timestamp(&a.created_at).is_some_and(|t| t.date_naive() == *day))
                    .count() as f64
            })
            .collect()
    };
    ChartSpec::new(
        "alertTrendChart",
        ChartKind::Line,
        ChartData {
            labels: days.iter().map(|d| d.format("%b %-d").to_string()).collect(),
            datasets: vec![
                DatasetSpec::line("Critical", count("Critical"), "#dc2626", "rgba(220, 38, 38, 0.1)"),
                DatasetSpec::line("Warning", count("Warning"), "#d97706", "rgba(217, 119, 6, 0.1)"),
                DatasetSpec::line("Info", count("Info"), "#0891b2", "rgba(8, 145, 178, 0.1)"),
            ],
        },
    )
}

/// Events per hour over the last 24 hours, oldest bucket first.
pub fn event_trend(events: &[Event], now: NaiveDateTime) -> ChartSpec {
    let top = now
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);
    let starts: Vec<NaiveDateTime> = (0..24).rev().map(|i| top - Duration::hours(i)).collect();
    let times: Vec<NaiveDateTime> = events.iter().filter_map(|e| event_time(&e.time, now)).collect();
    let data = starts
        .iter()
        .map(|start| {
            let end = *start + Duration::hours(1);
            times.iter().filter(|t| **t >= *start && **t < end).count() as f64
        })
        .collect();
    ChartSpec::new(
        "eventTrendChart",
        ChartKind::Line,
        ChartData {
            labels: starts.iter().map(|s| format!("{}:00", s.hour())).collect(),
            datasets: vec![DatasetSpec::line("Events", data, "#059669", "rgba(5, 150, 105, 0.1)")],
        },
    )
}

pub fn event_types(events: &[Event]) -> ChartSpec {
    let mut counts: BTreeMap<&str, f64> = BTreeMap::new();
    for e in events {
        *counts.entry(e.kind.as_str()).or_default() += 1.0;
    }
    let colors = counts
        .keys()
        .map(|k| {
            match *k {
                "Normal" => "#059669",
                "Warning" => "#d97706",
                "Error" => "#dc2626",
                _ => "#0891b2",
            }
            .to_string()
        })
        .collect();
    doughnut(
        "eventTypeChart",
        counts.keys().map(|k| k.to_string()).collect(),
        counts.values().copied().collect(),
        colors,
        "#ffffff",
    )
}

/// Fixed-length window of the most recent samples.
#[derive(Debug, Clone)]
pub struct RollingSeries {
    cap: usize,
    labels: VecDeque<String>,
    values: VecDeque<f64>,
}

impl RollingSeries {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            labels: VecDeque::with_capacity(cap),
            values: VecDeque::with_capacity(cap),
        }
    }

    pub fn push(&mut self, label: String, value: f64) {
        if self.values.len() == self.cap {
            self.labels.pop_front();
            self.values.pop_front();
        }
        self.labels.push_back(label);
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn chart(&self, canvas_id: &str, label: &str, color: (&str, &str)) -> ChartSpec {
        let mut ds = DatasetSpec::line(label, self.values.iter().copied().collect(), color.0, color.1);
        ds.fill = Some(true);
        ChartSpec::new(
            canvas_id,
            ChartKind::Line,
            ChartData {
                labels: self.labels.iter().cloned().collect(),
                datasets: vec![ds],
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::api::SeriesDataset;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn series(n: usize) -> LineSeries {
        LineSeries {
            labels: vec!["00:00".into(), "01:00".into()],
            datasets: (0..n)
                .map(|i| SeriesDataset {
                    label: format!("s{}", i),
                    data: vec![1.0, 2.0],
                    ..Default::default()
                })
                .collect(),
        }
    }

    #[test]
    fn line_defaults_cycle_palette() {
        let spec = line_chart("networkTrafficChart", &series(5));
        let borders: Vec<_> = spec.data.datasets.iter().map(|d| d.border_color.clone()).collect();
        assert_eq!(borders[0], Paint::One("#4CAF50".into()));
        assert_eq!(borders[3], Paint::One("#9C27B0".into()));
        assert_eq!(borders[4], Paint::One("#4CAF50".into()));

        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["canvasId"], "networkTrafficChart");
        assert_eq!(json["kind"], "line");
        let ds = &json["data"]["datasets"][1];
        assert_eq!(ds["backgroundColor"], "rgba(33, 150, 243, 0.1)");
        assert_eq!(ds["borderWidth"], 2);
        assert_eq!(ds["pointRadius"], 4);
        assert_eq!(ds["pointHoverRadius"], 6);
        assert_eq!(ds["tension"], 0.1);
        assert_eq!(json["simulated"], false);
    }

    #[test]
    fn backend_colors_win() {
        let mut s = series(1);
        s.datasets[0].border_color = Some("#123456".into());
        let spec = line_chart("diskIoChart", &s);
        assert_eq!(spec.data.datasets[0].border_color, Paint::One("#123456".into()));
    }

    #[test]
    fn failed_fetch_is_unavailable_unless_simulating() {
        let err = || ApiError::MissingData {
            path: "/api/monitoring/disk-io".into(),
        };
        let spec = line_or_fallback("diskIoChart", Err(err()), false, &["Read"], (0.0, 10.0));
        assert!(spec.is_unavailable());
        assert!(!spec.simulated);

        let spec = line_or_fallback("diskIoChart", Err(err()), true, &["Read", "Write"], (0.0, 10.0));
        assert!(spec.simulated);
        assert_eq!(spec.data.datasets.len(), 2);
        assert_eq!(spec.data.labels.len(), 12);
    }

    #[test]
    fn simulated_values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let s = simulated_series(&mut rng, &["CPU"], (20.0, 40.0));
        assert!(s.datasets[0].data.iter().all(|v| (20.0..=40.0).contains(v)));
    }

    #[test]
    fn node_bars_colored_by_usage() {
        let nodes = vec![
            Node {
                name: "a".into(),
                cpu: crate::models::api::CpuInfo { cores: 4, usage: 10.0 },
                ..Default::default()
            },
            Node {
                name: "b".into(),
                cpu: crate::models::api::CpuInfo { cores: 4, usage: 90.0 },
                ..Default::default()
            },
        ];
        let spec = node_usage_chart("nodeCpuChart", "CPU usage (%)", &nodes, |n| n.cpu.usage);
        assert_eq!(spec.kind, ChartKind::Bar);
        assert_eq!(
            spec.data.datasets[0].background_color,
            Paint::Each(vec!["rgba(5, 150, 105, 0.8)".into(), "rgba(220, 38, 38, 0.8)".into()])
        );
        assert_eq!(
            spec.data.datasets[0].border_color,
            Paint::Each(vec!["rgba(5, 150, 105, 1)".into(), "rgba(220, 38, 38, 1)".into()])
        );
    }

    #[test]
    fn alert_trend_buckets_by_day() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
        let alerts = vec![
            Alert {
                severity: "Critical".into(),
                created_at: "2024-05-07T09:00:00Z".into(),
                ..Default::default()
            },
            Alert {
                severity: "Critical".into(),
                created_at: "2024-05-01T09:00:00Z".into(),
                ..Default::default()
            },
            Alert {
                severity: "Warning".into(),
                created_at: "2024-04-20T09:00:00Z".into(),
                ..Default::default()
            },
        ];
        let spec = alert_trend(&alerts, today);
        assert_eq!(spec.data.labels.len(), 7);
        assert_eq!(spec.data.labels[6], "May 7");
        assert_eq!(spec.data.datasets[0].data, vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        assert!(spec.data.datasets[1].data.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn event_trend_has_24_hourly_buckets() {
        let now = NaiveDate::from_ymd_opt(2024, 5, 7)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let events = vec![
            Event {
                time: "10:05:00".into(),
                ..Default::default()
            },
            Event {
                time: "09:59:59".into(),
                ..Default::default()
            },
            Event {
                time: "11:00:00".into(),
                ..Default::default()
            },
        ];
        let spec = event_trend(&events, now);
        let data = &spec.data.datasets[0].data;
        assert_eq!(data.len(), 24);
        assert_eq!(spec.data.labels[23], "10:00");
        assert_eq!(data[23], 1.0);
        assert_eq!(data[22], 1.0);
        // 11:00 is read as yesterday, which falls in the oldest bucket
        assert_eq!(data[0], 1.0);
    }

    #[test]
    fn event_type_counts() {
        let events: Vec<Event> = ["Normal", "Warning", "Normal"]
            .iter()
            .map(|k| Event {
                kind: k.to_string(),
                ..Default::default()
            })
            .collect();
        let spec = event_types(&events);
        assert_eq!(spec.data.labels, ["Normal", "Warning"]);
        assert_eq!(spec.data.datasets[0].data, vec![2.0, 1.0]);
    }

    #[test]
    fn rolling_series_keeps_latest() {
        let mut s = RollingSeries::new(12);
        for i in 0..15 {
            s.push(format!("t{}", i), i as f64);
        }
        assert_eq!(s.len(), 12);
        let spec = s.chart("cpuChart", "CPU", ("#2563eb", "rgba(37, 99, 235, 0.1)"));
        assert_eq!(spec.data.labels.first().map(String::as_str), Some("t3"));
        assert_eq!(spec.data.datasets[0].data.last(), Some(&14.0));
    }
}
