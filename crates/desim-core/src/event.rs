//! Scheduled invocations held by an [`EventList`](crate::list::EventList)

use crate::id::{next_event_id, EventId};
use crate::time::TimePoint;
use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::fmt;
use std::rc::{Rc, Weak};

/// A callback scheduled on a simulator.
///
/// Arguments are captured by the closure itself rather than threaded through
/// as a separate positional/keyword pack (the natural Rust rendering of the
/// source's `function_args`/`function_kwargs`). Callers keep the strong `Rc`
/// alive for as long as the callback should remain schedulable; the event
/// itself only ever holds a [`Weak`] reference to it.
pub type SharedCallback = Rc<RefCell<dyn FnMut()>>;

/// Wrap a closure as a [`SharedCallback`] suitable for `schedule_event_*`.
pub fn callback<F: FnMut() + 'static>(f: F) -> SharedCallback {
    Rc::new(RefCell::new(f))
}

/// Relative firing precedence among events scheduled for the same time.
///
/// Ordered so that `HIGH < DEFAULT < LOW` as integers, matching "lower value
/// fires first".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Priority {
    High = 0,
    Default = 1,
    Low = 2,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Default
    }
}

/// Tags an event as the ABM heartbeat or an ordinary user-scheduled callback.
///
/// `DEVSimulator` never produces anything but `Default`; `ABMSimulator` tags
/// its self-perpetuating step event `ModelStep` so the post-execute hook can
/// recognize it without comparing callable identity to anything but itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    ModelStep,
    Default,
}

struct EventInner {
    callback: RefCell<Option<Weak<RefCell<dyn FnMut()>>>>,
    canceled: Cell<bool>,
}

/// A single scheduled invocation: a time, a priority, a construction-order
/// tiebreak, and a weak reference to the callback that runs when it fires.
///
/// Cloning a `SimulationEvent` is cheap and shares identity with the
/// original — both clones observe the same cancellation state, which is how
/// the value returned from `schedule_event_*` and the copy physically stored
/// in the `EventList` stay in sync when a caller cancels it.
#[derive(Clone)]
pub struct SimulationEvent<T: TimePoint> {
    time: T,
    priority: Priority,
    unique_id: EventId,
    event_type: EventType,
    inner: Rc<EventInner>,
}

impl<T: TimePoint> SimulationEvent<T> {
    /// Construct a new event firing `callback` at `time` with the given
    /// `priority` and `event_type`. `callback` is downgraded to a weak
    /// reference immediately — the caller retains the strong `Rc`.
    pub fn new(
        time: T,
        priority: Priority,
        event_type: EventType,
        callback: &SharedCallback,
    ) -> Self {
        Self {
            time,
            priority,
            unique_id: next_event_id(),
            event_type,
            inner: Rc::new(EventInner {
                callback: RefCell::new(Some(Rc::downgrade(callback))),
                canceled: Cell::new(false),
            }),
        }
    }

    /// Construct directly from an already-weak callback. Used internally for
    /// ABM heartbeat reinsertion and exposed for tests that need to exercise
    /// the weak-reference-law (construct, drop the strong owner, execute).
    pub fn from_weak(
        time: T,
        priority: Priority,
        event_type: EventType,
        callback: Weak<RefCell<dyn FnMut()>>,
    ) -> Self {
        Self {
            time,
            priority,
            unique_id: next_event_id(),
            event_type,
            inner: Rc::new(EventInner {
                callback: RefCell::new(Some(callback)),
                canceled: Cell::new(false),
            }),
        }
    }

    pub fn time(&self) -> T {
        self.time
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn unique_id(&self) -> EventId {
        self.unique_id
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn is_canceled(&self) -> bool {
        self.inner.canceled.get()
    }

    /// A fresh clone of the weak callback reference, for identity comparison
    /// against another strong `Rc` (see `ABMSimulator`'s heartbeat check).
    /// Returns `None` once the event has been canceled.
    pub fn callback_weak(&self) -> Option<Weak<RefCell<dyn FnMut()>>> {
        self.inner.callback.borrow().clone()
    }

    /// Resolve the weak callback reference and run the closure.
    ///
    /// A no-op, not an error, if the event is canceled or the callback's
    /// owner has already been dropped.
    pub fn execute(&self) {
        if self.is_canceled() {
            return;
        }
        let weak = self.inner.callback.borrow().clone();
        let Some(weak) = weak else {
            return;
        };
        if let Some(strong) = weak.upgrade() {
            (strong.borrow_mut())();
        }
    }

    /// Mark the event canceled and drop its callback reference. Idempotent;
    /// safe to call on an event that has already fired or already been
    /// canceled.
    pub fn cancel(&self) {
        self.inner.canceled.set(true);
        *self.inner.callback.borrow_mut() = None;
    }
}

impl<T: TimePoint> fmt::Debug for SimulationEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationEvent")
            .field("time", &self.time)
            .field("priority", &self.priority)
            .field("unique_id", &self.unique_id)
            .field("event_type", &self.event_type)
            .field("canceled", &self.is_canceled())
            .finish()
    }
}

impl<T: TimePoint> PartialEq for SimulationEvent<T> {
    fn eq(&self, other: &Self) -> bool {
        self.unique_id == other.unique_id
    }
}

impl<T: TimePoint> Eq for SimulationEvent<T> {}

/// Total order on `(time, priority, unique_id)`, lexicographic — the ordering
/// a min-heap needs to always surface the smallest event first. `time` only
/// offers `PartialOrd` (NaN for `f64`), so a NaN comparison falls back to the
/// `unique_id` tiebreak rather than panicking.
impl<T: TimePoint> PartialOrd for SimulationEvent<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: TimePoint> Ord for SimulationEvent<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.time.partial_cmp(&other.time) {
            Some(Ordering::Equal) | None => self
                .priority
                .cmp(&other.priority)
                .then_with(|| self.unique_id.cmp(&other.unique_id)),
            Some(ord) => ord,
        }
    }
}
