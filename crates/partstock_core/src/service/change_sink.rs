//! Seam between committed mutations and whoever reacts to them.
//!
//! # Invariants
//! - `mutation_committed` is called only after the store write succeeded.
//! - Implementations must return promptly and never fail the caller.

use std::fmt::{Display, Formatter};
use std::sync::Mutex;

/// Kind of inventory mutation that was committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Add,
    Use,
    Restock,
    Delete,
}

impl MutationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Use => "use",
            Self::Restock => "restock",
            Self::Delete => "delete",
        }
    }
}

impl Display for MutationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trigger token describing one committed mutation.
///
/// Carries no inventory data; receivers take their own snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationEvent {
    pub kind: MutationKind,
    pub part_name: String,
}

/// Receiver of committed-mutation events.
pub trait ChangeSink {
    fn mutation_committed(&self, event: MutationEvent);
}

impl<S: ChangeSink + ?Sized> ChangeSink for &S {
    fn mutation_committed(&self, event: MutationEvent) {
        (**self).mutation_committed(event);
    }
}

/// Sink that drops every event. Used by read-only shells.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChangeSink;

impl ChangeSink for NoopChangeSink {
    fn mutation_committed(&self, _event: MutationEvent) {}
}

/// Sink that keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingChangeSink {
    events: Mutex<Vec<MutationEvent>>,
}

impl RecordingChangeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<MutationEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ChangeSink for RecordingChangeSink {
    fn mutation_committed(&self, event: MutationEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
