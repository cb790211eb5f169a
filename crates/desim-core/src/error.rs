//! Error types for the simulation core

use thiserror::Error;

/// Simulation error types.
///
/// The core never catches or logs these — every scheduling or driving call
/// site propagates them to its caller. Canceled events and reclaimed weak
/// callback references are deliberately *not* represented here: they degrade
/// to silent no-ops rather than errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// `setup()` preconditions violated: the model's clock was not at zero,
    /// or the event list was not empty.
    #[error("invalid setup: {0}")]
    InvalidSetup(String),

    /// A bad argument was passed to a scheduling or query operation (a
    /// `peek_ahead` count less than one, a negative relative delay).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An event was scheduled at a time strictly before the model's current
    /// clock.
    #[error("cannot schedule at {requested:?}: current time is already {now:?}")]
    PastTimeError { requested: f64, now: f64 },

    /// A driving operation (`run_until`, `run_for`, `run_next_event`) was
    /// invoked on a simulator that has not been `setup()` with a model.
    #[error("simulator has not been configured with a model")]
    NotConfigured,

    /// `pop_event` or `peek_ahead` was called on a list with no non-canceled
    /// events left to surface.
    #[error("event list is empty")]
    EmptyQueue,
}

/// Result type alias for simulation core operations.
pub type SimResult<T> = Result<T, SimError>;
