use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Wire types of the monitoring backend. Every field the backend may omit is
// defaulted so a partial payload still renders.

// --- Auth ---

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub remember_me: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub expires_in: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    #[default]
    #[serde(other)]
    Guest,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Guest => "guest",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CurrentUser {
    #[serde(default, alias = "id")]
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}

// --- Stats ---

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct OverviewStats {
    pub total_containers: u64,
    pub running_containers: u64,
    pub active_nodes: u64,
    pub healthy_nodes: u64,
    pub system_health: f64,
    pub uptime: f64,
    pub warning_alerts: u64,
    pub critical_alerts: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DashboardStats {
    pub containers: ContainerStats,
    pub nodes: NodeStats,
    pub resources: ResourceStats,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ContainerStats {
    pub total: u64,
    pub running: u64,
    pub stopped: u64,
    pub failed: u64,
    pub total_change: String,
    pub running_change: String,
    pub stopped_change: String,
    pub failed_change: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct NodeStats {
    pub total: u64,
    pub healthy: u64,
    pub warning: u64,
    pub total_change: String,
    pub healthy_change: String,
    pub warning_change: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ResourceStats {
    pub avg_cpu: f64,
    pub avg_memory: f64,
    pub network_traffic: f64,
    pub cpu_change: String,
    pub memory_change: String,
    pub network_change: String,
}

// --- Containers ---

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Container {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub cpu: f64,
    #[serde(default)]
    pub memory: MemoryUsage,
    #[serde(default)]
    pub network: Option<NetworkRate>,
    #[serde(default)]
    pub node: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub uptime: String,
    #[serde(default)]
    pub restart_count: u32,
}

/// Container memory arrives either as a breakdown or as plain megabytes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MemoryUsage {
    Detailed {
        #[serde(default)]
        used: f64,
        #[serde(default)]
        total: f64,
        #[serde(default)]
        usage: f64,
    },
    Megabytes(f64),
}

impl Default for MemoryUsage {
    fn default() -> Self {
        MemoryUsage::Megabytes(0.0)
    }
}

impl MemoryUsage {
    pub fn used_mb(&self) -> f64 {
        match self {
            MemoryUsage::Detailed { used, .. } => *used,
            MemoryUsage::Megabytes(mb) => *mb,
        }
    }

    pub fn usage_pct(&self) -> f64 {
        match self {
            MemoryUsage::Detailed { usage, .. } => *usage,
            MemoryUsage::Megabytes(_) => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(default)]
pub struct NetworkRate {
    pub rx: f64,
    pub tx: f64,
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(default)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ContainerPage {
    #[serde(default)]
    pub containers: Vec<Container>,
    #[serde(default)]
    pub pagination: Pagination,
}

// --- Nodes ---

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Node {
    pub name: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub cpu: CpuInfo,
    #[serde(default)]
    pub memory: CapacityInfo,
    #[serde(default)]
    pub disk: CapacityInfo,
    #[serde(default)]
    pub containers: u32,
    #[serde(default)]
    pub uptime: String,
    #[serde(default)]
    pub last_heartbeat: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(default)]
pub struct CpuInfo {
    pub cores: u32,
    pub usage: f64,
}

/// Total in GB, usage in percent.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(default)]
pub struct CapacityInfo {
    pub total: f64,
    pub usage: f64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct NodeList {
    #[serde(default)]
    pub nodes: Vec<Node>,
}

// --- Alerts ---

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Alert {
    pub id: String,
    #[serde(default)]
    pub alert_type: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AlertSummary {
    pub critical: u64,
    pub warning: u64,
    pub info: u64,
    pub resolved: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AlertList {
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub summary: AlertSummary,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AlertDetail {
    pub id: String,
    #[serde(default)]
    pub alert_type: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub resolved_at: Option<String>,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub metric_value: Option<serde_json::Value>,
    #[serde(default)]
    pub threshold: Option<serde_json::Value>,
    #[serde(default)]
    pub resolution_notes: Option<String>,
    #[serde(default)]
    pub affected_services: Vec<String>,
    #[serde(default)]
    pub escalation_level: Option<u32>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Basic alert fields only; used when the detail endpoint has nothing.
impl From<Alert> for AlertDetail {
    fn from(a: Alert) -> Self {
        Self {
            id: a.id,
            alert_type: a.alert_type,
            target: a.target,
            message: a.message,
            severity: a.severity,
            status: a.status,
            created_at: a.created_at,
            duration: a.duration,
            source: a.source,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlertDetailData {
    pub alert: AlertDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AlertRule {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AlertRuleList {
    #[serde(default)]
    pub rules: Vec<AlertRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertRuleUpdate {
    pub name: String,
    pub target: String,
    pub condition: String,
    pub severity: String,
    pub status: String,
}

// --- Events ---

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Event {
    #[serde(default)]
    pub id: Option<String>,
    /// Wall-clock time of day, `HH:MM` or `HH:MM:SS`.
    #[serde(default)]
    pub time: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct EventSummary {
    pub today_events: u64,
    pub warning_events: u64,
    pub normal_events: u64,
    pub system_events: u64,
    pub today_change: String,
    pub warning_change: String,
    pub normal_change: String,
    pub system_change: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct EventList {
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub summary: EventSummary,
}

// --- Logs ---

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LogEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub container_id: Option<String>,
    #[serde(default)]
    pub container_name: Option<String>,
    #[serde(default)]
    pub pod_name: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
}

impl LogEntry {
    /// Container a log line belongs to, for filtering and `data-container`.
    pub fn container(&self) -> &str {
        self.container_id
            .as_deref()
            .or(self.container_name.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LogStats {
    pub total_logs: u64,
    pub info_count: u64,
    pub warn_count: u64,
    pub error_count: u64,
    pub debug_count: u64,
    pub time_range: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LogList {
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    #[serde(default)]
    pub stats: Option<LogStats>,
}

// --- Monitoring ---

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SeriesDataset {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub data: Vec<f64>,
    #[serde(default, rename = "borderColor")]
    pub border_color: Option<String>,
    #[serde(default, rename = "backgroundColor")]
    pub background_color: Option<String>,
}

/// Line series as the monitoring endpoints send them.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LineSeries {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub datasets: Vec<SeriesDataset>,
}

/// Request-status distribution. Older backends wrap the values in a dataset.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StatusDistribution {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub data: Vec<f64>,
    #[serde(default)]
    pub datasets: Vec<SeriesDataset>,
}

impl StatusDistribution {
    pub fn values(&self) -> &[f64] {
        if !self.data.is_empty() {
            &self.data
        } else {
            self.datasets.first().map(|d| d.data.as_slice()).unwrap_or(&[])
        }
    }
}

// --- Admin ---

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AdminStats {
    pub total_users: u64,
    pub active_users: u64,
    pub admin_users: u64,
    pub recent_logins: u64,
    pub new_users_today: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct User {
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub last_login: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UserPage {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
}

/// Create/update body. `password` is left out entirely when not being changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPayload {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_defaults_to_guest() {
        let me: CurrentUser =
            serde_json::from_str(r#"{"user_id":"u1","username":"kim"}"#).unwrap();
        assert_eq!(me.role, Role::Guest);
        let me: CurrentUser =
            serde_json::from_str(r#"{"user_id":"u1","username":"kim","role":"owner"}"#).unwrap();
        assert_eq!(me.role, Role::Guest);
        let me: CurrentUser =
            serde_json::from_str(r#"{"user_id":"u1","username":"kim","role":"admin"}"#).unwrap();
        assert!(me.is_admin());
    }

    #[test]
    fn container_memory_in_both_shapes() {
        let c: Container = serde_json::from_str(
            r#"{"id":"c1","memory":{"used":256,"total":1024,"usage":25}}"#,
        )
        .unwrap();
        assert_eq!(c.memory.used_mb(), 256.0);
        assert_eq!(c.memory.usage_pct(), 25.0);

        let c: Container = serde_json::from_str(r#"{"id":"c1","memory":512}"#).unwrap();
        assert_eq!(c.memory.used_mb(), 512.0);
        assert!(c.network.is_none());
    }

    #[test]
    fn user_payload_omits_unchanged_password() {
        let body = UserPayload {
            username: "kim".into(),
            password: None,
            full_name: "Kim Lee".into(),
            email: "kim@example.com".into(),
            role: "user".into(),
            is_active: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "kim");
    }

    #[test]
    fn status_distribution_reads_either_shape() {
        let flat: StatusDistribution =
            serde_json::from_str(r#"{"labels":["2xx","5xx"],"data":[90,10]}"#).unwrap();
        assert_eq!(flat.values(), &[90.0, 10.0]);
        let nested: StatusDistribution =
            serde_json::from_str(r#"{"labels":["2xx"],"datasets":[{"data":[7]}]}"#).unwrap();
        assert_eq!(nested.values(), &[7.0]);
    }
}
