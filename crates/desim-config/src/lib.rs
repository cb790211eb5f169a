//! Run configuration loading and validation for desim

pub mod config;
pub mod validation;

pub use config::{ConfigError, RunConfig, TimeUnit};
pub use validation::{validate_run_config, FieldPath, ValidationError, ValidationErrorKind};
