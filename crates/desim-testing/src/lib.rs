//! Test fixtures and batch run harness built on `desim-core`
//!
//! This crate provides:
//! - [`generator::CountingModel`], a bare [`desim_core::Model`] for
//!   engine-level tests that don't need a domain model of their own
//! - [`generator::EventSequenceBuilder`] for scheduling deterministic,
//!   countable event sequences
//! - [`runner::BatchRunner`] for running many seeded simulations in
//!   parallel via rayon

pub mod generator;
pub mod runner;

pub use generator::{CountingCallback, CountingModel, EventSequenceBuilder};
pub use runner::{BatchRunner, RunResult};
