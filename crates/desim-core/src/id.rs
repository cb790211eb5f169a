//! Process-wide unique id allocation for scheduled events

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier assigned to a [`SimulationEvent`](crate::event::SimulationEvent) at
/// construction time.
///
/// Breaks ties between events with equal `(time, priority)`: the event constructed
/// earlier carries the smaller id and therefore fires first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(u64);

impl EventId {
    /// Get the inner value.
    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

static NEXT_EVENT_ID: AtomicU64 = AtomicU64::new(0);

/// Allocate the next globally unique, monotonically increasing event id.
///
/// Backed by a process-wide atomic counter: it only needs to break ties within a
/// single process and does not need to persist across restarts.
pub fn next_event_id() -> EventId {
    EventId(NEXT_EVENT_ID.fetch_add(1, Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_strictly_monotone() {
        let a = next_event_id();
        let b = next_event_id();
        let c = next_event_id();
        assert!(a < b);
        assert!(b < c);
    }
}
