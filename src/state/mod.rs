pub mod alerts;
pub mod sequencer;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{RwLock, watch};
use tokio::time::{self, Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::api::{AlertRule, Event, LogEntry};
use crate::page::Page;
use alerts::AlertBoard;
use sequencer::Sequencer;

/// Page-scoped data. Each page only touches its own part.
#[derive(Debug, Default)]
pub struct PageData {
    pub alerts: AlertBoard,
    pub rules: Vec<AlertRule>,
    pub events: Vec<Event>,
    pub logs: Vec<LogEntry>,
}

/// State of one opened page. Created on page entry and dropped when the same
/// session opens the page again or the view goes idle.
#[derive(Debug)]
pub struct PageView {
    pub id: Uuid,
    pub page: Page,
    owner: String,
    last_seen: Mutex<Instant>,
    pub sequencer: Sequencer,
    data: Mutex<PageData>,
}

impl PageView {
    fn new(page: Page, owner: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            page,
            owner: owner.to_string(),
            last_seen: Mutex::new(Instant::now()),
            sequencer: Sequencer::default(),
            data: Mutex::new(PageData::default()),
        }
    }

    pub fn with_data<R>(&self, f: impl FnOnce(&mut PageData) -> R) -> R {
        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut data)
    }

    fn touch(&self) {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    fn idle_for(&self, now: Instant) -> Duration {
        let seen = *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner);
        now.saturating_duration_since(seen)
    }
}

pub struct ViewStore {
    views: RwLock<HashMap<Uuid, Arc<PageView>>>,
    ttl: Duration,
}

impl ViewStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            views: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Start a fresh view of `page` for the session, discarding any earlier
    /// view the session had of the same page.
    pub async fn open(&self, page: Page, owner: &str) -> Arc<PageView> {
        let view = Arc::new(PageView::new(page, owner));
        let mut views = self.views.write().await;
        views.retain(|_, v| !(v.page == page && v.owner == owner));
        views.insert(view.id, view.clone());
        debug!("opened {} view {}", page, view.id);
        view
    }

    /// Look up a view that belongs to `owner` and shows `page`.
    pub async fn get(&self, id: Uuid, page: Page, owner: &str) -> Option<Arc<PageView>> {
        let views = self.views.read().await;
        let view = views
            .get(&id)
            .filter(|v| v.page == page && v.owner == owner)
            .cloned()?;
        view.touch();
        Some(view)
    }

    /// Drop every view of a session, e.g. on logout.
    pub async fn close_owner(&self, owner: &str) {
        self.views.write().await.retain(|_, v| v.owner != owner);
    }

    pub async fn len(&self) -> usize {
        self.views.read().await.len()
    }

    pub async fn sweep(&self) -> usize {
        self.sweep_at(Instant::now()).await
    }

    async fn sweep_at(&self, now: Instant) -> usize {
        let mut views = self.views.write().await;
        let before = views.len();
        views.retain(|_, v| v.idle_for(now) < self.ttl);
        before - views.len()
    }

    pub async fn run_sweeper(self: Arc<Self>, mut shutdown: watch::Receiver<()>) {
        let period = (self.ttl / 4).clamp(Duration::from_secs(1), Duration::from_secs(60));
        let mut interval = time::interval(period);
        interval.tick().await; // skip first immediate tick

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let n = self.sweep().await;
                    if n > 0 {
                        debug!("expired {} idle page views", n);
                    }
                }
                _ = shutdown.changed() => {
                    info!("view sweeper shutting down");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reopening_a_page_replaces_the_view() {
        let store = ViewStore::new(Duration::from_secs(60));
        let first = store.open(Page::Alerts, "tok").await;
        let other = store.open(Page::Events, "tok").await;
        let second = store.open(Page::Alerts, "tok").await;

        assert!(store.get(first.id, Page::Alerts, "tok").await.is_none());
        assert!(store.get(second.id, Page::Alerts, "tok").await.is_some());
        assert!(store.get(other.id, Page::Events, "tok").await.is_some());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn views_are_private_to_their_session_and_page() {
        let store = ViewStore::new(Duration::from_secs(60));
        let view = store.open(Page::Logs, "tok-a").await;
        assert!(store.get(view.id, Page::Logs, "tok-b").await.is_none());
        assert!(store.get(view.id, Page::Alerts, "tok-a").await.is_none());

        store.close_owner("tok-a").await;
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn idle_views_expire() {
        let store = ViewStore::new(Duration::from_secs(30));
        let view = store.open(Page::Alerts, "a").await;
        let now = Instant::now();

        assert_eq!(store.sweep_at(now + Duration::from_secs(10)).await, 0);
        assert_eq!(store.sweep_at(now + Duration::from_secs(31)).await, 1);
        assert!(store.get(view.id, Page::Alerts, "a").await.is_none());
    }

    #[tokio::test]
    async fn page_data_is_per_view() {
        let store = ViewStore::new(Duration::from_secs(60));
        let a = store.open(Page::Events, "a").await;
        let b = store.open(Page::Events, "b").await;
        a.with_data(|d| d.events.push(Event::default()));
        assert_eq!(a.with_data(|d| d.events.len()), 1);
        assert_eq!(b.with_data(|d| d.events.len()), 0);
    }
}
