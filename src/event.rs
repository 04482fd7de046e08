//! Structured events emitted by the dashboard on every mutation.
//!
//! Deferred and rejected transitions are recorded too, so the log shows
//! every status change an operator attempted, not only the ones applied.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lifecycle::{InputKind, Rejection};
use crate::store::EntityKind;

/// A structured event emitted by the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Monotonic sequence number, starting at 1.
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    EntityCreated {
        entity: EntityKind,
        id: Uuid,
        status: String,
    },
    EntityDeleted {
        entity: EntityKind,
        id: Uuid,
    },
    StatusChanged {
        entity: EntityKind,
        id: Uuid,
        from: String,
        to: String,
    },
    TransitionDeferred {
        entity: EntityKind,
        id: Uuid,
        target: String,
        needs: InputKind,
    },
    TransitionRejected {
        entity: EntityKind,
        id: Uuid,
        target: String,
        rejection: Rejection,
    },
    ProgressAppended {
        id: Uuid,
        count: usize,
    },
    ProgressRemoved {
        id: Uuid,
        indices: Vec<usize>,
    },
    ProgressPercentageSet {
        id: Uuid,
        percentage: u8,
    },
}

/// Append-only, in-memory event log.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, timestamp: DateTime<Utc>, kind: EventKind) -> &Event {
        let seq = self.events.len() as u64 + 1;
        self.events.push(Event {
            seq,
            timestamp,
            kind,
        });
        &self.events[self.events.len() - 1]
    }

    /// Events with `seq > since_seq`, oldest first.
    pub fn since(&self, since_seq: u64) -> &[Event] {
        let start = usize::try_from(since_seq)
            .unwrap_or(usize::MAX)
            .min(self.events.len());
        &self.events[start..]
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
