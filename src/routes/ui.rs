use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{Local, Utc};
use serde::Deserialize;

use crate::AppState;
use crate::clients::logs::LogQuery;
use crate::filters::{EventFilter, LogFilter, highlight};
use crate::helpers::{fmt_num, human_time, local_datetime, rate_scaled, rate_short, time_ago, usage_color};
use crate::models::api::{
    AdminStats, Alert, AlertDetail, AlertRule, AlertSummary, Container, CurrentUser, Event, EventSummary, LogEntry,
    LogStats, Node, User,
};
use crate::models::views::*;
use crate::page::Page;
use crate::pagination::{Pager, total_pages};
use crate::session::{self, Session};
use crate::state::PageView;
use crate::state::alerts::AlertBoard;

use super::fragments::{EventRegion, LogRegion, event_region, log_region};

// --- Layout ---

pub struct NavItem {
    pub href: String,
    pub label: &'static str,
    pub icon: &'static str,
    pub active: bool,
}

/// Everything the shared layout needs.
pub struct Chrome {
    pub title: String,
    pub page: &'static str,
    pub user_name: String,
    pub is_admin: bool,
    pub nav: Vec<NavItem>,
    pub view_id: String,
    pub refresh_ms: u64,
    pub heartbeat_ms: u64,
}

fn nav_icon(page: Page) -> &'static str {
    match page {
        Page::Home => "fas fa-home",
        Page::Dashboard => "fas fa-tachometer-alt",
        Page::Containers => "fab fa-docker",
        Page::Nodes => "fas fa-server",
        Page::Alerts => "fas fa-bell",
        Page::Events => "fas fa-list-alt",
        Page::Logs => "fas fa-file-alt",
        Page::Monitoring => "fas fa-chart-line",
        Page::Admin => "fas fa-user-shield",
    }
}

impl Chrome {
    pub fn new(state: &AppState, page: Page, title: &str, user: Option<&CurrentUser>, view: &PageView) -> Self {
        let is_admin = user.is_some_and(CurrentUser::is_admin);
        let nav = Page::ALL
            .into_iter()
            .filter(|p| *p != Page::Admin || is_admin)
            .map(|p| NavItem {
                href: p.href(),
                label: p.title(),
                icon: nav_icon(p),
                active: p == page,
            })
            .collect();
        Self {
            title: title.to_string(),
            page: page.slug(),
            user_name: user.map(|u| u.display_name().to_string()).unwrap_or_default(),
            is_admin,
            nav,
            view_id: view.id.to_string(),
            refresh_ms: state.config.refresh_interval().as_millis() as u64,
            heartbeat_ms: state.config.session.heartbeat_interval_secs.max(1) * 1000,
        }
    }
}

pub(crate) fn render_template(tmpl: &impl Template) -> Response {
    match tmpl.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("template error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// Rendered markup of a fragment, for JSON payloads.
pub(crate) fn render_html(tmpl: &impl Template) -> Result<String, Response> {
    tmpl.render().map_err(|e| {
        tracing::error!("template error: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    })
}

/// The signed-in user. A rejected token ends the session; any other failure
/// only hides the user-specific parts of the layout.
async fn current_user(state: &AppState, session: &Session) -> Result<Option<CurrentUser>, Response> {
    match state.backend.current_user(&session.token).await {
        Ok(user) => Ok(Some(user)),
        Err(e) if e.is_unauthorized() => {
            tracing::info!("session token rejected, returning to login");
            state.views.close_owner(&session.token).await;
            let mut headers = HeaderMap::new();
            session::set_cookies(&mut headers, session::clear_tokens(&state.cookies()));
            Err((headers, Redirect::to("/")).into_response())
        }
        Err(e) => {
            tracing::warn!("failed to load current user: {}", e);
            Ok(None)
        }
    }
}

// --- Login ---

#[derive(Template)]
#[template(path = "login.html")]
pub(crate) struct LoginTemplate {
    pub error: Option<String>,
    pub username: String,
    pub remember: bool,
}

pub async fn handle_login_page(headers: HeaderMap) -> Response {
    if session::token(&headers).is_some() {
        return Redirect::to(&Page::Home.href()).into_response();
    }
    let remembered = session::remembered_user(&headers);
    render_template(&LoginTemplate {
        error: None,
        remember: remembered.is_some(),
        username: remembered.unwrap_or_default(),
    })
}

// --- Page dispatch ---

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<u32>,
}

pub async fn handle_page(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
    Query(q): Query<PageQuery>,
) -> Response {
    let Some(page) = Page::from_path(&slug) else {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    };
    let user = match current_user(&state, &session).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    if page == Page::Admin && !user.as_ref().is_some_and(CurrentUser::is_admin) {
        return Redirect::to(&Page::Home.href()).into_response();
    }

    let view = state.views.open(page, &session.token).await;
    let user = user.as_ref();
    let page_no = q.page.unwrap_or(1).max(1);

    match page {
        Page::Home => home(&state, &session, user, &view).await,
        Page::Dashboard => dashboard(&state, &session, user, &view).await,
        Page::Containers => containers(&state, &session, user, &view, page_no).await,
        Page::Nodes => nodes(&state, &session, user, &view).await,
        Page::Alerts => alerts(&state, &session, user, &view).await,
        Page::Events => events(&state, &session, user, &view).await,
        Page::Logs => logs(&state, &session, user, &view).await,
        Page::Monitoring => monitoring(&state, &session, user, &view).await,
        Page::Admin => admin(&state, &session, user, &view, page_no).await,
    }
}

// --- Home ---

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    chrome: Chrome,
    cards: OverviewCards,
}

async fn home(state: &AppState, session: &Session, user: Option<&CurrentUser>, view: &PageView) -> Response {
    let cards = match state.backend.overview_stats(&session.token).await {
        Ok(stats) => OverviewCards::from_stats(&stats),
        Err(e) => {
            tracing::warn!("failed to load overview stats: {}", e);
            OverviewCards::unavailable()
        }
    };
    render_template(&HomeTemplate {
        chrome: Chrome::new(state, Page::Home, "Home", user, view),
        cards,
    })
}

// --- Dashboard ---

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    chrome: Chrome,
    cards: DashboardCards,
    recent_alerts: Listing<RecentAlertCard>,
}

async fn dashboard(state: &AppState, session: &Session, user: Option<&CurrentUser>, view: &PageView) -> Response {
    let token = session.token.as_str();
    let (stats, nodes, alerts) = tokio::join!(
        state.backend.dashboard_stats(token),
        state.backend.nodes(token),
        state.backend.alerts(token),
    );
    let stats = stats
        .map_err(|e| tracing::warn!("failed to load dashboard stats: {}", e))
        .ok();
    let nodes = nodes.map_err(|e| tracing::warn!("failed to load nodes: {}", e)).ok();
    let cards = DashboardCards::build(stats.as_ref(), nodes.as_deref());

    let recent_alerts = Listing::from_result("recent alerts", alerts.map(|list| list.alerts))
        .map(|a| build_recent_alert(&a));
    let recent_alerts = match recent_alerts {
        Listing::Rows(mut rows) => {
            rows.truncate(3);
            Listing::Rows(rows)
        }
        other => other,
    };

    render_template(&DashboardTemplate {
        chrome: Chrome::new(state, Page::Dashboard, "Dashboard", user, view),
        cards,
        recent_alerts,
    })
}

// --- Containers ---

#[derive(Template)]
#[template(path = "containers.html")]
struct ContainersTemplate {
    chrome: Chrome,
    containers: Listing<ContainerRow>,
    pager: Pager,
}

/// Rows and pager of one containers page.
pub(crate) async fn container_page(state: &AppState, token: &str, page: u32) -> (Listing<ContainerRow>, Pager) {
    match state
        .backend
        .containers(token, page, state.config.per_page.containers)
        .await
    {
        Ok(resp) => (
            Listing::from_rows(resp.containers).map(|c| build_container_row(&c)),
            Pager::new(page, resp.pagination.total_pages),
        ),
        Err(e) => {
            tracing::warn!("failed to load containers: {}", e);
            (Listing::Failed, Pager::new(page, 0))
        }
    }
}

async fn containers(
    state: &AppState,
    session: &Session,
    user: Option<&CurrentUser>,
    view: &PageView,
    page: u32,
) -> Response {
    let (containers, pager) = container_page(state, &session.token, page).await;
    render_template(&ContainersTemplate {
        chrome: Chrome::new(state, Page::Containers, "Containers", user, view),
        containers,
        pager,
    })
}

#[derive(Template)]
#[template(path = "container_detail.html")]
struct ContainerDetailTemplate {
    chrome: Chrome,
    id: String,
    container: Option<ContainerRow>,
}

pub async fn handle_container_detail(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Response {
    let user = match current_user(&state, &session).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let view = state.views.open(Page::Containers, &session.token).await;
    let container = match state.backend.container(&session.token, &id).await {
        Ok(c) => Some(build_container_row(&c)),
        Err(e) => {
            tracing::warn!("failed to load container {}: {}", id, e);
            None
        }
    };
    render_template(&ContainerDetailTemplate {
        chrome: Chrome::new(&state, Page::Containers, "Container", user.as_ref(), &view),
        id,
        container,
    })
}

// --- Nodes ---

#[derive(Template)]
#[template(path = "nodes.html")]
struct NodesTemplate {
    chrome: Chrome,
    nodes: Listing<NodeRow>,
}

async fn nodes(state: &AppState, session: &Session, user: Option<&CurrentUser>, view: &PageView) -> Response {
    let nodes = Listing::from_result("nodes", state.backend.nodes(&session.token).await).map(|n| build_node_row(&n));
    render_template(&NodesTemplate {
        chrome: Chrome::new(state, Page::Nodes, "Nodes", user, view),
        nodes,
    })
}

#[derive(Template)]
#[template(path = "node_detail.html")]
struct NodeDetailTemplate {
    chrome: Chrome,
    name: String,
    node: Option<NodeRow>,
}

pub async fn handle_node_detail(
    State(state): State<AppState>,
    session: Session,
    Path(name): Path<String>,
) -> Response {
    let user = match current_user(&state, &session).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let view = state.views.open(Page::Nodes, &session.token).await;
    let node = match state.backend.node(&session.token, &name).await {
        Ok(n) => Some(build_node_row(&n)),
        Err(e) => {
            tracing::warn!("failed to load node {}: {}", name, e);
            None
        }
    };
    render_template(&NodeDetailTemplate {
        chrome: Chrome::new(&state, Page::Nodes, &name, user.as_ref(), &view),
        name,
        node,
    })
}

// --- Alerts ---

#[derive(Template)]
#[template(path = "alerts.html")]
struct AlertsTemplate {
    chrome: Chrome,
    summary: AlertSummary,
    alerts: Listing<AlertRow>,
    rules: Listing<RuleRow>,
}

async fn alerts(state: &AppState, session: &Session, user: Option<&CurrentUser>, view: &PageView) -> Response {
    let token = session.token.as_str();
    let (alerts, rules) = tokio::join!(state.backend.alerts(token), state.backend.alert_rules(token));

    let (summary, alert_rows) = match alerts {
        Ok(list) => view.with_data(|d| {
            d.alerts.load(list);
            (d.alerts.summary(), alert_rows(&d.alerts))
        }),
        Err(e) => {
            tracing::warn!("failed to load alerts: {}", e);
            (AlertSummary::default(), Listing::Failed)
        }
    };
    let rules = match rules {
        Ok(rules) => view.with_data(|d| {
            d.rules = rules;
            rule_rows(&d.rules)
        }),
        Err(e) => {
            tracing::warn!("failed to load alert rules: {}", e);
            Listing::Failed
        }
    };

    render_template(&AlertsTemplate {
        chrome: Chrome::new(state, Page::Alerts, "Alerts", user, view),
        summary,
        alerts: alert_rows,
        rules,
    })
}

pub(crate) fn alert_rows(board: &AlertBoard) -> Listing<AlertRow> {
    Listing::from_rows(
        board
            .alerts()
            .iter()
            .map(|a| build_alert_row(a, board.is_resolved(&a.id)))
            .collect(),
    )
}

pub(crate) fn rule_rows(rules: &[AlertRule]) -> Listing<RuleRow> {
    Listing::from_rows(rules.iter().map(build_rule_row).collect())
}

// --- Events ---

#[derive(Template)]
#[template(path = "events.html")]
struct EventsTemplate {
    chrome: Chrome,
    summary: EventSummary,
    today_change: ChangeView,
    warning_change: ChangeView,
    normal_change: ChangeView,
    system_change: ChangeView,
    region: EventRegion,
}

async fn events(state: &AppState, session: &Session, user: Option<&CurrentUser>, view: &PageView) -> Response {
    let (summary, failed) = match state.backend.events(&session.token).await {
        Ok(list) => {
            view.with_data(|d| d.events = list.events);
            (list.summary, false)
        }
        Err(e) => {
            tracing::warn!("failed to load events: {}", e);
            (EventSummary::default(), true)
        }
    };
    let region = view.with_data(|d| event_region(&d.events, &EventFilter::default(), "", failed));

    render_template(&EventsTemplate {
        chrome: Chrome::new(state, Page::Events, "Events", user, view),
        today_change: ChangeView::of(&summary.today_change),
        warning_change: ChangeView::of(&summary.warning_change),
        normal_change: ChangeView::of(&summary.normal_change),
        system_change: ChangeView::of(&summary.system_change),
        summary,
        region,
    })
}

// --- Logs ---

#[derive(Template)]
#[template(path = "logs.html")]
struct LogsTemplate {
    chrome: Chrome,
    stats: LogStats,
    containers: Vec<String>,
    region: LogRegion,
}

async fn logs(state: &AppState, session: &Session, user: Option<&CurrentUser>, view: &PageView) -> Response {
    let token = session.token.as_str();
    let query = LogQuery::default();
    let (list, stats) = tokio::join!(state.backend.logs(token, &query), state.backend.log_stats(token, "24h"));

    let failed = match list {
        Ok(list) => {
            view.with_data(|d| d.logs = list.logs);
            false
        }
        Err(e) => {
            tracing::warn!("failed to load logs: {}", e);
            true
        }
    };
    let stats = stats
        .map_err(|e| tracing::warn!("failed to load log stats: {}", e))
        .unwrap_or_default();

    let (containers, region) = view.with_data(|d| {
        (
            log_containers(&d.logs),
            log_region(&d.logs, &LogFilter::default(), failed),
        )
    });

    render_template(&LogsTemplate {
        chrome: Chrome::new(state, Page::Logs, "Logs", user, view),
        stats,
        containers,
        region,
    })
}

fn log_containers(entries: &[LogEntry]) -> Vec<String> {
    let set: std::collections::BTreeSet<&str> = entries
        .iter()
        .map(LogEntry::container)
        .filter(|c| !c.is_empty())
        .collect();
    set.into_iter().map(str::to_string).collect()
}

// --- Monitoring ---

#[derive(Template)]
#[template(path = "monitoring.html")]
struct MonitoringTemplate {
    chrome: Chrome,
    node_cards: Listing<NodeCard>,
    top: Listing<TopContainerRow>,
}

async fn monitoring(state: &AppState, session: &Session, user: Option<&CurrentUser>, view: &PageView) -> Response {
    let token = session.token.as_str();
    let (nodes, containers) = tokio::join!(state.backend.nodes(token), state.backend.containers(token, 1, 100));

    let node_cards = Listing::from_result("nodes", nodes).map(|n| build_node_card(&n));
    let top = match containers {
        Ok(page) => Listing::from_rows(top_containers(page.containers)),
        Err(e) => {
            tracing::warn!("failed to load containers: {}", e);
            Listing::Failed
        }
    };

    render_template(&MonitoringTemplate {
        chrome: Chrome::new(state, Page::Monitoring, "Monitoring", user, view),
        node_cards,
        top,
    })
}

/// Ten busiest containers by CPU, busiest first.
pub(crate) fn top_containers(mut containers: Vec<Container>) -> Vec<TopContainerRow> {
    containers.sort_by(|a, b| b.cpu.total_cmp(&a.cpu));
    containers
        .iter()
        .take(10)
        .enumerate()
        .map(|(i, c)| {
            let memory = c.memory.usage_pct();
            TopContainerRow {
                rank: i + 1,
                rank_class: rank_badge(i),
                icon: image_icon(&c.image),
                name: c.name.clone(),
                node: if c.node.is_empty() { "Unknown".to_string() } else { c.node.clone() },
                cpu: c.cpu.clamp(0.0, 100.0),
                cpu_text: format!("{:.1}%", c.cpu),
                cpu_color: usage_var(c.cpu),
                memory: memory.clamp(0.0, 100.0),
                memory_color: usage_var(memory),
                rx: c.network.map(|n| rate_scaled(n.rx)).unwrap_or_else(|| "0 B/s".to_string()),
                tx: c.network.map(|n| rate_scaled(n.tx)).unwrap_or_else(|| "0 B/s".to_string()),
                status: c.status.clone(),
                status_class: c.status.to_lowercase(),
            }
        })
        .collect()
}

// --- Admin ---

#[derive(Template)]
#[template(path = "admin.html")]
struct AdminTemplate {
    chrome: Chrome,
    stats: Option<AdminStats>,
    users: Listing<UserRow>,
    pager: Pager,
}

/// Rows and pager of one users page.
pub(crate) async fn user_page(state: &AppState, token: &str, page: u32) -> (Listing<UserRow>, Pager) {
    let per_page = state.config.per_page.users;
    match state.backend.users(token, page, per_page).await {
        Ok(resp) => (
            Listing::from_rows(resp.users).map(|u| build_user_row(&u)),
            Pager::new(page, total_pages(resp.total, per_page)),
        ),
        Err(e) => {
            tracing::warn!("failed to load users: {}", e);
            (Listing::Failed, Pager::new(page, 0))
        }
    }
}

async fn admin(
    state: &AppState,
    session: &Session,
    user: Option<&CurrentUser>,
    view: &PageView,
    page: u32,
) -> Response {
    let token = session.token.as_str();
    let (stats, (users, pager)) = tokio::join!(state.backend.admin_stats(token), user_page(state, token, page));
    let stats = stats
        .map_err(|e| tracing::warn!("failed to load admin stats: {}", e))
        .ok();

    render_template(&AdminTemplate {
        chrome: Chrome::new(state, Page::Admin, "Administration", user, view),
        stats,
        users,
        pager,
    })
}

// --- View Builders ---

pub(crate) fn build_container_row(c: &Container) -> ContainerRow {
    let memory_pct = c.memory.usage_pct();
    ContainerRow {
        id: c.id.clone(),
        name: c.name.clone(),
        image: c.image.clone(),
        status: c.status.clone(),
        status_class: container_status_class(&c.status),
        cpu: format!("{:.1}%", c.cpu),
        cpu_width: c.cpu.clamp(0.0, 100.0),
        cpu_color: usage_color(c.cpu),
        memory: format!("{}MB ({}%)", fmt_num(c.memory.used_mb()), fmt_num(memory_pct)),
        memory_width: memory_pct.clamp(0.0, 100.0),
        memory_color: usage_color(memory_pct),
        rx: c.network.map(|n| rate_short(n.rx)).unwrap_or_else(|| "0 B/s".to_string()),
        tx: c.network.map(|n| rate_short(n.tx)).unwrap_or_else(|| "0 B/s".to_string()),
        node: if c.node.is_empty() { "N/A".to_string() } else { c.node.clone() },
        created: local_datetime(&c.created_at),
        uptime: c.uptime.clone(),
        restart_count: c.restart_count,
    }
}

pub(crate) fn build_node_row(n: &Node) -> NodeRow {
    let (status_class, status_icon) = node_status(&n.status);
    NodeRow {
        name: n.name.clone(),
        ip: n.ip.clone(),
        role: n.role.clone(),
        status: n.status.clone(),
        status_class,
        status_icon,
        cpu_cores: n.cpu.cores,
        cpu_usage: n.cpu.usage,
        cpu_color: usage_color(n.cpu.usage),
        memory_total: format!("{} GB", fmt_num(n.memory.total)),
        memory_usage: n.memory.usage,
        memory_color: usage_color(n.memory.usage),
        disk_total: format!("{} GB", fmt_num(n.disk.total)),
        disk_usage: n.disk.usage,
        disk_color: usage_color(n.disk.usage),
        containers: n.containers,
        uptime: n.uptime.clone(),
        last_heartbeat: human_time(Some(&n.last_heartbeat)),
    }
}

fn build_node_card(n: &Node) -> NodeCard {
    let (status_class, status_icon) = node_status(&n.status);
    NodeCard {
        name: n.name.clone(),
        status: n.status.clone(),
        status_class,
        status_icon,
        cpu: n.cpu.usage,
        cpu_color: usage_var(n.cpu.usage),
        memory: n.memory.usage,
        memory_color: usage_var(n.memory.usage),
        disk: n.disk.usage,
        disk_color: disk_var(n.disk.usage),
    }
}

pub(crate) fn build_alert_row(a: &Alert, hidden: bool) -> AlertRow {
    let (severity_class, row_class) = alert_severity_classes(&a.severity);
    AlertRow {
        id: a.id.clone(),
        alert_type: a.alert_type.clone(),
        target: a.target.clone(),
        message: a.message.clone(),
        severity: a.severity.clone(),
        severity_class,
        row_class,
        status: a.status.clone(),
        created: local_datetime(&a.created_at),
        duration: a.duration.clone(),
        source: a.source.clone(),
        hidden,
    }
}

fn build_recent_alert(a: &Alert) -> RecentAlertCard {
    let (card_class, badge_class, label) = recent_alert_classes(&a.severity);
    RecentAlertCard {
        card_class,
        badge_class,
        label,
        alert_type: a.alert_type.clone(),
        target: a.target.clone(),
        message: a.message.clone(),
        created: local_datetime(&a.created_at),
    }
}

pub(crate) fn build_rule_row(r: &AlertRule) -> RuleRow {
    let (status_class, status_label) = rule_status(&r.status);
    RuleRow {
        id: r.id.clone(),
        name: r.name.clone(),
        target: r.target.clone(),
        condition: r.condition.clone(),
        severity: r.severity.clone(),
        severity_class: rule_severity_class(&r.severity),
        status: r.status.clone(),
        status_class,
        status_label,
        created: r.created_at.as_deref().map(local_datetime).unwrap_or_else(|| "-".to_string()),
    }
}

fn or_dash(v: Option<&str>) -> String {
    match v {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => "-".to_string(),
    }
}

fn json_text(v: Option<&serde_json::Value>) -> String {
    match v {
        None | Some(serde_json::Value::Null) => "-".to_string(),
        Some(serde_json::Value::String(s)) => or_dash(Some(s)),
        Some(other) => other.to_string(),
    }
}

pub(crate) fn build_detail_view(d: &AlertDetail) -> AlertDetailView {
    let field = |label: &'static str, value: String| DetailField { label, value };
    AlertDetailView {
        id: d.id.clone(),
        alert_type: d.alert_type.clone(),
        severity: d.severity.clone(),
        severity_class: d.severity.to_lowercase(),
        status: d.status.clone(),
        status_class: detail_status_class(&d.status, &d.severity),
        message: d.message.clone(),
        fields: vec![
            field("Alert ID", d.id.clone()),
            field("Target", or_dash(Some(&d.target))),
            field("Source", or_dash(Some(&d.source))),
            field("Created", local_datetime(&d.created_at)),
            field("Updated", d.updated_at.as_deref().map(local_datetime).unwrap_or_else(|| "-".into())),
            field("Resolved", d.resolved_at.as_deref().map(local_datetime).unwrap_or_else(|| "-".into())),
            field("Duration", or_dash(Some(&d.duration))),
            field("Metric value", json_text(d.metric_value.as_ref())),
            field("Threshold", json_text(d.threshold.as_ref())),
            field("Assigned to", or_dash(d.assigned_to.as_deref())),
            field(
                "Escalation level",
                d.escalation_level.map(|l| l.to_string()).unwrap_or_else(|| "-".into()),
            ),
            field("Description", or_dash(d.description.as_deref())),
            field("Resolution notes", or_dash(d.resolution_notes.as_deref())),
        ],
        labels: d.labels.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        affected_services: d.affected_services.clone(),
        tags: d.tags.clone(),
        resolvable: d.status != "Resolved",
    }
}

pub(crate) fn build_event_row(e: &Event, term: &str, now: chrono::NaiveDateTime) -> EventRow {
    let badge = event_badge(&e.kind);
    let object_kind = e.object.split('-').next().unwrap_or("");
    EventRow {
        time: e.time.clone(),
        time_ago: crate::filters::event_time(&e.time, now)
            .map(|t| time_ago(t, now))
            .unwrap_or_default(),
        kind: highlight(&e.kind, term),
        kind_class: badge.class,
        kind_icon: badge.icon,
        reason_badge: badge.reason_badge,
        row_class: badge.row_class,
        object: highlight(&e.object, term),
        object_kind: highlight(object_kind, term),
        namespace: highlight(&e.namespace, term),
        reason: highlight(&e.reason, term),
        message: highlight(&e.message, term),
        source: highlight(&e.source, term),
    }
}

pub(crate) fn build_log_row(l: &LogEntry) -> LogRow {
    LogRow {
        timestamp: local_datetime(&l.timestamp),
        level: l.level.to_uppercase(),
        level_class: l.level.to_lowercase(),
        message: l.message.clone(),
        container: l.container().to_string(),
        source: l.source.clone(),
    }
}

pub(crate) fn build_user_row(u: &User) -> UserRow {
    let (active_class, active_label, role_class) = user_classes(u.is_active, &u.role);
    UserRow {
        user_id: u.user_id.clone(),
        username: u.username.clone(),
        full_name: u.full_name.clone(),
        email: u.email.clone(),
        role: u.role.clone(),
        role_class,
        is_active: u.is_active,
        active_class,
        active_label,
        created: local_datetime(&u.created_at),
        last_login: u
            .last_login
            .as_deref()
            .map(|t| human_time(Some(t)))
            .unwrap_or_else(|| "Never".to_string()),
    }
}

pub(crate) fn now_local() -> chrono::NaiveDateTime {
    Local::now().naive_local()
}

pub(crate) fn now_utc() -> chrono::DateTime<Utc> {
    Utc::now()
}
