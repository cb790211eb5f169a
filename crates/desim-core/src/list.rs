//! The time-ordered queue of scheduled events
//!
//! Backed by a `BinaryHeap`, which is a max-heap in Rust; [`SimulationEvent`]'s
//! `Ord` implementation is written in reverse (see `event.rs`) so that the
//! smallest `(time, priority, unique_id)` tuple — the next event due to fire —
//! is always the heap's greatest element and therefore its root.

use crate::error::{SimError, SimResult};
use crate::event::SimulationEvent;
use crate::time::TimePoint;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Min-ordered priority collection of [`SimulationEvent`]s.
///
/// Cancellation is logical: `remove` flips a shared flag on the event rather
/// than touching the heap, so it stays O(1) and never invalidates a handle a
/// caller is holding. `pop_event` and `peek_ahead` filter canceled entries as
/// they scan; a canceled entry surfacing at the head during `pop_event` is
/// simply discarded, which is the list's only form of compaction.
pub struct EventList<T: TimePoint> {
    heap: BinaryHeap<Reverse<SimulationEvent<T>>>,
}

impl<T: TimePoint> Default for EventList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimePoint> EventList<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    /// Insert `event`. O(log n).
    pub fn add_event(&mut self, event: SimulationEvent<T>) {
        self.heap.push(Reverse(event));
    }

    /// Pop the earliest non-canceled event, discarding any canceled entries
    /// encountered ahead of it. `EmptyQueue` if none remain.
    pub fn pop_event(&mut self) -> SimResult<SimulationEvent<T>> {
        while let Some(Reverse(event)) = self.heap.pop() {
            if !event.is_canceled() {
                return Ok(event);
            }
        }
        Err(SimError::EmptyQueue)
    }

    /// Return up to the first `n` non-canceled events in order, without
    /// permanently removing them. Canceled events encountered during the
    /// scan are discarded rather than restored. `n` must be at least one;
    /// `EmptyQueue` if no non-canceled event exists at all. The returned
    /// `Vec` may be shorter than `n` if fewer non-canceled events exist.
    pub fn peek_ahead(&mut self, n: usize) -> SimResult<Vec<SimulationEvent<T>>> {
        if n == 0 {
            return Err(SimError::InvalidArgument(
                "peek_ahead count must be at least 1".to_string(),
            ));
        }

        let mut held = Vec::new();
        while held.len() < n {
            match self.heap.pop() {
                Some(Reverse(event)) if event.is_canceled() => continue,
                Some(Reverse(event)) => held.push(event),
                None => break,
            }
        }

        for event in &held {
            self.heap.push(Reverse(event.clone()));
        }

        if held.is_empty() {
            return Err(SimError::EmptyQueue);
        }
        Ok(held)
    }

    /// Mark `event` canceled in place. Physical length is unaffected; the
    /// record surfaces and is discarded the next time it reaches the head.
    pub fn remove(&mut self, event: &SimulationEvent<T>) {
        event.cancel();
    }

    /// Physical length, including canceled entries not yet discarded.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Logical emptiness: true iff no non-canceled event is reachable.
    pub fn is_empty(&self) -> bool {
        self.heap.iter().all(|Reverse(event)| event.is_canceled())
    }

    /// True if `event` (by unique id) is still physically present, canceled
    /// or not.
    pub fn contains(&self, event: &SimulationEvent<T>) -> bool {
        self.heap
            .iter()
            .any(|Reverse(e)| e.unique_id() == event.unique_id())
    }

    /// Remove every entry, physically.
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Iterate over every physically-present event, canceled or not.
    pub fn iter(&self) -> impl Iterator<Item = &SimulationEvent<T>> {
        self.heap.iter().map(|Reverse(event)| event)
    }
}
