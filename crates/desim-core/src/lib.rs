//! Core types and discrete-event simulation engine
//!
//! This crate provides the event queue, the generic simulator engine, and
//! the two simulator flavors built on it: [`DEVSimulator`] for free-form
//! real-valued time, and [`ABMSimulator`] for integer-tick time with a
//! self-perpetuating per-tick heartbeat.

pub mod error;
pub mod event;
pub mod id;
pub mod list;
pub mod model;
pub mod rng;
pub mod simulator;
pub mod time;

pub use error::{SimError, SimResult};
pub use event::{callback, EventType, Priority, SharedCallback, SimulationEvent};
pub use id::EventId;
pub use list::EventList;
pub use model::Model;
pub use rng::SimRng;
pub use simulator::{ABMSimulator, DEVSimulator, Simulator};
pub use time::TimePoint;
