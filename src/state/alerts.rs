use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;

use crate::models::api::{Alert, AlertList, AlertSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoAction {
    Resolve,
}

#[derive(Debug, Clone)]
pub struct UndoEntry {
    pub action: UndoAction,
    pub alert_id: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Undo {
    /// The alert is visible again.
    Restored(String),
    /// The entry was popped but the alert had already been shown again.
    Stale(String),
    /// Nothing to restore.
    Empty,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("alert {0} is not on this page")]
    UnknownAlert(String),
    #[error("alert {0} is already resolved")]
    AlreadyResolved(String),
}

/// Alerts of one alerts-page view plus the locally resolved set and its undo
/// history. Local resolves never reach the backend.
#[derive(Debug, Default)]
pub struct AlertBoard {
    alerts: Vec<Alert>,
    summary: AlertSummary,
    resolved: HashSet<String>,
    undo: Vec<UndoEntry>,
}

impl AlertBoard {
    /// Replace the alert list. Local resolves survive for alerts still listed.
    pub fn load(&mut self, list: AlertList) {
        let ids: HashSet<&str> = list.alerts.iter().map(|a| a.id.as_str()).collect();
        self.resolved.retain(|id| ids.contains(id.as_str()));
        self.alerts = list.alerts;
        self.summary = list.summary;
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn summary(&self) -> AlertSummary {
        self.summary
    }

    pub fn is_resolved(&self, id: &str) -> bool {
        self.resolved.contains(id)
    }

    pub fn resolve(&mut self, id: &str) -> Result<(), BoardError> {
        if !self.alerts.iter().any(|a| a.id == id) {
            return Err(BoardError::UnknownAlert(id.to_string()));
        }
        if !self.resolved.insert(id.to_string()) {
            return Err(BoardError::AlreadyResolved(id.to_string()));
        }
        self.undo.push(UndoEntry {
            action: UndoAction::Resolve,
            alert_id: id.to_string(),
            at: Utc::now(),
        });
        Ok(())
    }

    /// Show a locally resolved alert again. Not recorded for undo.
    pub fn unresolve(&mut self, id: &str) -> bool {
        self.resolved.remove(id)
    }

    pub fn undo(&mut self) -> Undo {
        let Some(entry) = self.undo.pop() else {
            return Undo::Empty;
        };
        match entry.action {
            UndoAction::Resolve => {
                if self.resolved.remove(&entry.alert_id) {
                    Undo::Restored(entry.alert_id)
                } else {
                    Undo::Stale(entry.alert_id)
                }
            }
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(ids: &[&str]) -> AlertBoard {
        let mut b = AlertBoard::default();
        b.load(AlertList {
            alerts: ids
                .iter()
                .map(|id| Alert {
                    id: id.to_string(),
                    ..Default::default()
                })
                .collect(),
            summary: AlertSummary::default(),
        });
        b
    }

    #[test]
    fn undo_restores_in_lifo_order() {
        let mut b = board(&["a", "b"]);
        b.resolve("a").unwrap();
        b.resolve("b").unwrap();
        assert_eq!(b.undo_depth(), 2);

        assert_eq!(b.undo(), Undo::Restored("b".into()));
        assert!(b.is_resolved("a"));
        assert!(!b.is_resolved("b"));
        assert_eq!(b.undo(), Undo::Restored("a".into()));
        assert_eq!(b.undo(), Undo::Empty);
    }

    #[test]
    fn unresolve_is_not_recorded() {
        let mut b = board(&["a"]);
        b.resolve("a").unwrap();
        assert!(b.unresolve("a"));
        assert_eq!(b.undo_depth(), 1);
        assert_eq!(b.undo(), Undo::Stale("a".into()));
        assert_eq!(b.undo_depth(), 0);
    }

    #[test]
    fn resolving_twice_pushes_once() {
        let mut b = board(&["a"]);
        b.resolve("a").unwrap();
        assert_eq!(b.resolve("a"), Err(BoardError::AlreadyResolved("a".into())));
        assert_eq!(b.resolve("zz"), Err(BoardError::UnknownAlert("zz".into())));
        assert_eq!(b.undo_depth(), 1);
    }

    #[test]
    fn reload_keeps_resolves_for_listed_alerts() {
        let mut b = board(&["a", "b"]);
        b.resolve("a").unwrap();
        b.resolve("b").unwrap();
        b.load(AlertList {
            alerts: vec![Alert {
                id: "a".into(),
                ..Default::default()
            }],
            summary: AlertSummary::default(),
        });
        assert!(b.is_resolved("a"));
        assert!(!b.is_resolved("b"));
    }
}
