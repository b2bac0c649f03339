use chrono::Local;
use serde::Serialize;
use std::fmt::Display;

use crate::filters::Highlighted;
use crate::helpers::{Change, fmt_num, metric_change};
use crate::models::api::{DashboardStats, Node, OverviewStats};

/// What a data region shows: the rows, a "no data" placeholder or a
/// "failed to load" placeholder. Exactly one of the three.
#[derive(Debug, Clone)]
pub enum Listing<T> {
    Rows(Vec<T>),
    Empty,
    Failed,
}

impl<T> Listing<T> {
    pub fn from_rows(rows: Vec<T>) -> Self {
        if rows.is_empty() {
            Listing::Empty
        } else {
            Listing::Rows(rows)
        }
    }

    /// Logs the failure and degrades to the failed placeholder.
    pub fn from_result<E: Display>(what: &str, result: Result<Vec<T>, E>) -> Self {
        match result {
            Ok(rows) => Self::from_rows(rows),
            Err(e) => {
                tracing::warn!("failed to load {}: {}", what, e);
                Listing::Failed
            }
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listing<U> {
        match self {
            Listing::Rows(rows) => Listing::Rows(rows.into_iter().map(f).collect()),
            Listing::Empty => Listing::Empty,
            Listing::Failed => Listing::Failed,
        }
    }

    pub fn rows(&self) -> &[T] {
        match self {
            Listing::Rows(rows) => rows,
            _ => &[],
        }
    }

    pub fn is_empty_state(&self) -> bool {
        matches!(self, Listing::Empty)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Listing::Failed)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChangeView {
    pub text: String,
    pub class: &'static str,
    pub icon: &'static str,
}

impl ChangeView {
    pub fn of(value: &str) -> Self {
        let Change { class, icon } = metric_change(value);
        Self {
            text: value.to_string(),
            class,
            icon,
        }
    }
}

const NO_VALUE: &str = "-";

/// Home page cards. Serialized keys are the element ids the live stream
/// updates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewCards {
    pub total_containers: String,
    pub running_containers: String,
    pub active_nodes: String,
    pub healthy_nodes: String,
    pub system_health: String,
    pub uptime: String,
    pub warning_alerts: String,
    pub critical_alerts: String,
    pub last_update: String,
}

impl OverviewCards {
    pub fn from_stats(s: &OverviewStats) -> Self {
        Self {
            total_containers: s.total_containers.to_string(),
            running_containers: s.running_containers.to_string(),
            active_nodes: s.active_nodes.to_string(),
            healthy_nodes: s.healthy_nodes.to_string(),
            system_health: format!("{}%", fmt_num(s.system_health)),
            uptime: format!("{}%", fmt_num(s.uptime)),
            warning_alerts: s.warning_alerts.to_string(),
            critical_alerts: s.critical_alerts.to_string(),
            last_update: Local::now().format("%H:%M:%S").to_string(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            total_containers: NO_VALUE.into(),
            running_containers: NO_VALUE.into(),
            active_nodes: NO_VALUE.into(),
            healthy_nodes: NO_VALUE.into(),
            system_health: NO_VALUE.into(),
            uptime: NO_VALUE.into(),
            warning_alerts: NO_VALUE.into(),
            critical_alerts: NO_VALUE.into(),
            last_update: Local::now().format("%H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCards {
    pub total_containers: String,
    pub running_containers: String,
    pub stopped_containers: String,
    pub failed_containers: String,
    pub active_nodes: String,
    pub avg_cpu: String,
    pub avg_memory: String,
    pub network_traffic: String,
    pub total_change: ChangeView,
    pub running_change: ChangeView,
    pub stopped_change: ChangeView,
    pub failed_change: ChangeView,
    pub nodes_change: ChangeView,
    pub cpu_change: ChangeView,
    pub memory_change: ChangeView,
    pub network_change: ChangeView,
}

impl DashboardCards {
    /// Active nodes are the Ready ones when the node list is available,
    /// otherwise the stats total.
    pub fn build(stats: Option<&DashboardStats>, nodes: Option<&[Node]>) -> Self {
        let active = match (nodes, stats) {
            (Some(nodes), _) => nodes.iter().filter(|n| n.status == "Ready").count().to_string(),
            (None, Some(s)) => s.nodes.total.to_string(),
            (None, None) => NO_VALUE.to_string(),
        };
        let Some(s) = stats else {
            return Self {
                active_nodes: active,
                ..Self::unavailable()
            };
        };
        Self {
            total_containers: s.containers.total.to_string(),
            running_containers: s.containers.running.to_string(),
            stopped_containers: s.containers.stopped.to_string(),
            failed_containers: s.containers.failed.to_string(),
            active_nodes: active,
            avg_cpu: format!("{}%", fmt_num(s.resources.avg_cpu)),
            avg_memory: format!("{}%", fmt_num(s.resources.avg_memory)),
            network_traffic: format!("{}MB", fmt_num(s.resources.network_traffic)),
            total_change: ChangeView::of(&s.containers.total_change),
            running_change: ChangeView::of(&s.containers.running_change),
            stopped_change: ChangeView::of(&s.containers.stopped_change),
            failed_change: ChangeView::of(&s.containers.failed_change),
            nodes_change: ChangeView::of(&s.nodes.total_change),
            cpu_change: ChangeView::of(&s.resources.cpu_change),
            memory_change: ChangeView::of(&s.resources.memory_change),
            network_change: ChangeView::of(&s.resources.network_change),
        }
    }

    fn unavailable() -> Self {
        Self {
            total_containers: NO_VALUE.into(),
            running_containers: NO_VALUE.into(),
            stopped_containers: NO_VALUE.into(),
            failed_containers: NO_VALUE.into(),
            active_nodes: NO_VALUE.into(),
            avg_cpu: NO_VALUE.into(),
            avg_memory: NO_VALUE.into(),
            network_traffic: NO_VALUE.into(),
            total_change: ChangeView::of(""),
            running_change: ChangeView::of(""),
            stopped_change: ChangeView::of(""),
            failed_change: ChangeView::of(""),
            nodes_change: ChangeView::of(""),
            cpu_change: ChangeView::of(""),
            memory_change: ChangeView::of(""),
            network_change: ChangeView::of(""),
        }
    }
}

// --- Badge tables ---

pub fn container_status_class(status: &str) -> &'static str {
    match status.to_lowercase().as_str() {
        "running" => "running",
        "stopped" => "stopped",
        "failed" => "failed",
        "restarting" => "warning",
        _ => "info",
    }
}

/// (status badge class, table row class)
pub fn alert_severity_classes(severity: &str) -> (&'static str, &'static str) {
    match severity {
        "Critical" => ("stopped", "table-danger"),
        "Warning" => ("warning", "table-warning"),
        _ => ("pending", ""),
    }
}

/// (card class, badge class, label) for the dashboard's recent alerts.
pub fn recent_alert_classes(severity: &str) -> (&'static str, &'static str, &'static str) {
    match severity {
        "Critical" => ("danger", "stopped", "Critical"),
        "Warning" => ("warning", "warning", "Warning"),
        _ => ("success", "running", "Normal"),
    }
}

pub fn rule_severity_class(severity: &str) -> &'static str {
    match severity {
        "Critical" => "danger",
        "Warning" => "warning",
        _ => "info",
    }
}

/// (badge class, label)
pub fn rule_status(status: &str) -> (&'static str, &'static str) {
    match status {
        "Active" => ("running", "Active"),
        "Inactive" => ("stopped", "Inactive"),
        _ => ("warning", "Testing"),
    }
}

pub fn detail_status_class(status: &str, severity: &str) -> String {
    if status == "Resolved" {
        return "resolved".to_string();
    }
    match severity {
        "Critical" => "critical",
        "Warning" => "warning",
        _ => "info",
    }
    .to_string()
}

/// (class, icon)
pub fn node_status(status: &str) -> (&'static str, &'static str) {
    match status {
        "Ready" => ("status-ready", "fa-check-circle"),
        "NotReady" => ("status-not-ready", "fa-times-circle"),
        "Warning" => ("status-warning", "fa-exclamation-triangle"),
        _ => ("status-unknown", "fa-question-circle"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventBadge {
    pub class: &'static str,
    pub icon: &'static str,
    pub reason_badge: &'static str,
    pub row_class: &'static str,
}

pub fn event_badge(kind: &str) -> EventBadge {
    match kind {
        "Normal" => EventBadge {
            class: "running",
            icon: "fa-info-circle",
            reason_badge: "success",
            row_class: "",
        },
        "Warning" => EventBadge {
            class: "warning",
            icon: "fa-exclamation-triangle",
            reason_badge: "warning",
            row_class: "table-warning",
        },
        _ => EventBadge {
            class: "warning",
            icon: "fa-exclamation-triangle",
            reason_badge: "warning",
            row_class: "",
        },
    }
}

/// (active class, active label, role class)
pub fn user_classes(is_active: bool, role: &str) -> (&'static str, &'static str, &'static str) {
    let (active, label) = if is_active {
        ("active", "Active")
    } else {
        ("inactive", "Inactive")
    };
    let role = if role == "admin" { "admin" } else { "user" };
    (active, label, role)
}

/// Color variable for node and container usage on the monitoring page.
pub fn usage_var(pct: f64) -> &'static str {
    if pct < 30.0 {
        "var(--success-color)"
    } else if pct < 70.0 {
        "var(--warning-color)"
    } else {
        "var(--danger-color)"
    }
}

/// Disk runs one step milder than CPU and memory.
pub fn disk_var(pct: f64) -> &'static str {
    if pct < 30.0 {
        "var(--success-color)"
    } else if pct < 70.0 {
        "var(--info-color)"
    } else {
        "var(--warning-color)"
    }
}

pub fn rank_badge(index: usize) -> &'static str {
    match index {
        0 => "bg-danger",
        1 => "bg-warning",
        2 => "bg-info",
        _ => "bg-secondary",
    }
}

pub fn image_icon(image: &str) -> &'static str {
    if image.contains("elasticsearch") {
        "fas fa-cube text-primary"
    } else if image.contains("postgres") {
        "fab fa-docker text-info"
    } else if image.contains("api") {
        "fas fa-cube text-success"
    } else {
        "fas fa-cube text-secondary"
    }
}

// --- Rows ---

#[derive(Debug, Clone, Default)]
pub struct ContainerRow {
    pub id: String,
    pub name: String,
    pub image: String,
    pub status: String,
    pub status_class: &'static str,
    pub cpu: String,
    pub cpu_width: f64,
    pub cpu_color: &'static str,
    pub memory: String,
    pub memory_width: f64,
    pub memory_color: &'static str,
    pub rx: String,
    pub tx: String,
    pub node: String,
    pub created: String,
    pub uptime: String,
    pub restart_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct NodeRow {
    pub name: String,
    pub ip: String,
    pub role: String,
    pub status: String,
    pub status_class: &'static str,
    pub status_icon: &'static str,
    pub cpu_cores: u32,
    pub cpu_usage: f64,
    pub cpu_color: &'static str,
    pub memory_total: String,
    pub memory_usage: f64,
    pub memory_color: &'static str,
    pub disk_total: String,
    pub disk_usage: f64,
    pub disk_color: &'static str,
    pub containers: u32,
    pub uptime: String,
    pub last_heartbeat: String,
}

#[derive(Debug, Clone, Default)]
pub struct AlertRow {
    pub id: String,
    pub alert_type: String,
    pub target: String,
    pub message: String,
    pub severity: String,
    pub severity_class: &'static str,
    pub row_class: &'static str,
    pub status: String,
    pub created: String,
    pub duration: String,
    pub source: String,
    /// Resolved locally in this page view.
    pub hidden: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RecentAlertCard {
    pub card_class: &'static str,
    pub badge_class: &'static str,
    pub label: &'static str,
    pub alert_type: String,
    pub target: String,
    pub message: String,
    pub created: String,
}

#[derive(Debug, Clone, Default)]
pub struct RuleRow {
    pub id: String,
    pub name: String,
    pub target: String,
    pub condition: String,
    pub severity: String,
    pub severity_class: &'static str,
    pub status: String,
    pub status_class: &'static str,
    pub status_label: &'static str,
    pub created: String,
}

#[derive(Debug, Clone, Default)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct AlertDetailView {
    pub id: String,
    pub alert_type: String,
    pub severity: String,
    pub severity_class: String,
    pub status: String,
    pub status_class: String,
    pub message: String,
    pub fields: Vec<DetailField>,
    pub labels: Vec<(String, String)>,
    pub affected_services: Vec<String>,
    pub tags: Vec<String>,
    pub resolvable: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EventRow {
    pub time: String,
    pub time_ago: String,
    pub kind: Highlighted,
    pub kind_class: &'static str,
    pub kind_icon: &'static str,
    pub reason_badge: &'static str,
    pub row_class: &'static str,
    pub object: Highlighted,
    pub object_kind: Highlighted,
    pub namespace: Highlighted,
    pub reason: Highlighted,
    pub message: Highlighted,
    pub source: Highlighted,
}

#[derive(Debug, Clone, Default)]
pub struct LogRow {
    pub timestamp: String,
    pub level: String,
    pub level_class: String,
    pub message: String,
    pub container: String,
    pub source: String,
}

#[derive(Debug, Clone, Default)]
pub struct UserRow {
    pub user_id: String,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub role_class: &'static str,
    pub is_active: bool,
    pub active_class: &'static str,
    pub active_label: &'static str,
    pub created: String,
    pub last_login: String,
}

#[derive(Debug, Clone, Default)]
pub struct NodeCard {
    pub name: String,
    pub status: String,
    pub status_class: &'static str,
    pub status_icon: &'static str,
    pub cpu: f64,
    pub cpu_color: &'static str,
    pub memory: f64,
    pub memory_color: &'static str,
    pub disk: f64,
    pub disk_color: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct TopContainerRow {
    pub rank: usize,
    pub rank_class: &'static str,
    pub icon: &'static str,
    pub name: String,
    pub node: String,
    pub cpu: f64,
    pub cpu_text: String,
    pub cpu_color: &'static str,
    pub memory: f64,
    pub memory_color: &'static str,
    pub rx: String,
    pub tx: String,
    pub status: String,
    pub status_class: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_states_are_exclusive() {
        let rows: Listing<u32> = Listing::from_rows(vec![]);
        assert!(rows.is_empty_state());
        assert!(rows.rows().is_empty());

        let failed: Listing<u32> = Listing::from_result("things", Err("boom"));
        assert!(failed.is_failed());
        assert!(!failed.is_empty_state());

        let ok = Listing::from_result::<&str>("things", Ok(vec![3, 1, 2])).map(|n| n * 10);
        assert_eq!(ok.rows(), &[30, 10, 20]);
        assert!(!ok.is_failed() && !ok.is_empty_state());
    }

    #[test]
    fn container_badges() {
        assert_eq!(container_status_class("running"), "running");
        assert_eq!(container_status_class("Stopped"), "stopped");
        assert_eq!(container_status_class("failed"), "failed");
        assert_eq!(container_status_class("restarting"), "warning");
        assert_eq!(container_status_class("paused"), "info");
    }

    #[test]
    fn alert_badges() {
        assert_eq!(alert_severity_classes("Critical"), ("stopped", "table-danger"));
        assert_eq!(alert_severity_classes("Warning"), ("warning", "table-warning"));
        assert_eq!(alert_severity_classes("Info"), ("pending", ""));
        assert_eq!(recent_alert_classes("Info"), ("success", "running", "Normal"));
        assert_eq!(rule_severity_class("Critical"), "danger");
        assert_eq!(rule_status("Paused"), ("warning", "Testing"));
        assert_eq!(detail_status_class("Resolved", "Critical"), "resolved");
        assert_eq!(detail_status_class("Active", "Warning"), "warning");
    }

    #[test]
    fn node_and_event_badges() {
        assert_eq!(node_status("NotReady"), ("status-not-ready", "fa-times-circle"));
        assert_eq!(node_status("Draining"), ("status-unknown", "fa-question-circle"));
        assert_eq!(event_badge("Normal").reason_badge, "success");
        assert_eq!(event_badge("Warning").row_class, "table-warning");
        assert_eq!(event_badge("Error").class, "warning");
        assert_eq!(user_classes(false, "guest"), ("inactive", "Inactive", "user"));
    }

    #[test]
    fn monitoring_tables() {
        assert_eq!(rank_badge(0), "bg-danger");
        assert_eq!(rank_badge(3), "bg-secondary");
        assert_eq!(image_icon("docker.elastic.co/elasticsearch:8"), "fas fa-cube text-primary");
        assert_eq!(image_icon("postgres:15"), "fab fa-docker text-info");
        assert_eq!(image_icon("corp/api-gateway"), "fas fa-cube text-success");
        assert_eq!(image_icon("nginx"), "fas fa-cube text-secondary");
        assert_eq!(disk_var(50.0), "var(--info-color)");
        assert_eq!(usage_var(50.0), "var(--warning-color)");
    }

    #[test]
    fn overview_cards_from_stats() {
        let stats: OverviewStats = serde_json::from_str(
            r#"{"total_containers":12,"running_containers":9,"active_nodes":3,"healthy_nodes":3,
                "system_health":98.5,"uptime":99,"warning_alerts":2,"critical_alerts":1}"#,
        )
        .unwrap();
        let cards = OverviewCards::from_stats(&stats);
        assert_eq!(cards.total_containers, "12");
        assert_eq!(cards.running_containers, "9");
        assert_eq!(cards.system_health, "98.5%");
        assert_eq!(cards.uptime, "99%");

        let json = serde_json::to_value(&cards).unwrap();
        assert_eq!(json["totalContainers"], "12");
        assert_eq!(json["runningContainers"], "9");
    }

    #[test]
    fn dashboard_counts_ready_nodes() {
        let stats = DashboardStats::default();
        let nodes = vec![
            Node {
                status: "Ready".into(),
                ..Default::default()
            },
            Node {
                status: "NotReady".into(),
                ..Default::default()
            },
        ];
        assert_eq!(DashboardCards::build(Some(&stats), Some(&nodes)).active_nodes, "1");

        let mut stats = DashboardStats::default();
        stats.nodes.total = 4;
        stats.containers.running_change = "+2".into();
        let cards = DashboardCards::build(Some(&stats), None);
        assert_eq!(cards.active_nodes, "4");
        assert_eq!(cards.running_change.icon, "fas fa-arrow-up");
        assert_eq!(DashboardCards::build(None, None).avg_cpu, "-");
    }
}
