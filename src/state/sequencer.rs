use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Data regions of a page that are fetched independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Containers,
    Alerts,
    AlertRules,
    Events,
    Logs,
    Users,
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub resource: Resource,
    pub id: u64,
}

#[derive(Debug, Default)]
struct Counters {
    issued: u64,
    rendered: u64,
}

/// Orders overlapping fetches of the same resource. A response may only be
/// rendered when its ticket is newer than the last rendered one.
#[derive(Debug, Default)]
pub struct Sequencer {
    counters: Mutex<HashMap<Resource, Counters>>,
}

impl Sequencer {
    pub fn issue(&self, resource: Resource) -> Ticket {
        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        let c = counters.entry(resource).or_default();
        c.issued += 1;
        Ticket {
            resource,
            id: c.issued,
        }
    }

    /// Returns false when a newer response was already rendered.
    pub fn commit(&self, ticket: Ticket) -> bool {
        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        let c = counters.entry(ticket.resource).or_default();
        if ticket.id <= c.rendered {
            return false;
        }
        c.rendered = ticket.id;
        true
    }
}
