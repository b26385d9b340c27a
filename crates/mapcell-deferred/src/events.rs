//! Change tracking for deferred map cells
//!
//! Every accepted write is recorded as a [`ChangeEvent`] in a bounded
//! [`ChangeLog`] and handed to subscribed listeners.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::rc::Rc;

/// What a write did to the cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeKind {
    /// Whole value replaced
    Replaced {
        /// Entries in the new value
        entries: usize,
    },
    /// Entries merged into the value
    Merged {
        /// Entries in the merged batch
        entries: usize,
    },
    /// Lazy provider installed as the value or as a pending addition
    ProviderAttached,
    /// Reset to the explicit empty mapping
    Cleared,
    /// Explicit value discarded; the convention applies
    Unset,
    /// Convention changed
    ConventionChanged,
    /// Value frozen
    Finalized,
    /// Further writes refused
    ChangesDisallowed,
}

/// A recorded change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Monotonic per-cell sequence number, starting at 1
    pub sequence: u64,
    /// Display name of the cell
    pub cell: String,
    /// Change description
    pub kind: ChangeKind,
}

/// Identifier returned by `subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

pub(crate) type Listener = Rc<dyn Fn(&ChangeEvent)>;

/// Bounded history of change events
#[derive(Debug)]
pub struct ChangeLog {
    events: VecDeque<ChangeEvent>,
    capacity: usize,
    next_sequence: u64,
}

impl ChangeLog {
    /// Create log keeping at most `capacity` events
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            next_sequence: 1,
        }
    }

    /// Append an event, evicting the oldest beyond capacity
    pub fn record(&mut self, cell: &str, kind: ChangeKind) -> ChangeEvent {
        let event = ChangeEvent {
            sequence: self.next_sequence,
            cell: cell.to_string(),
            kind,
        };
        self.next_sequence += 1;

        if self.capacity > 0 {
            if self.events.len() == self.capacity {
                self.events.pop_front();
            }
            self.events.push_back(event.clone());
        }
        event
    }

    /// Retained events, oldest first
    #[must_use]
    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.iter().cloned().collect()
    }

    /// Most recent event
    #[must_use]
    pub fn last(&self) -> Option<&ChangeEvent> {
        self.events.back()
    }

    /// Number of changes ever recorded
    #[must_use]
    pub fn total(&self) -> u64 {
        self.next_sequence - 1
    }

    /// Number of retained events
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are retained
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
