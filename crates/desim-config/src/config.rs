//! Run configuration: the parameters a caller supplies to drive a simulator

use desim_core::Priority;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors encountered loading or parsing a [`RunConfig`].
///
/// Distinct from `desim_core::SimError`: this crate's errors are about
/// getting a `RunConfig` off disk and into memory, not about anything the
/// engine itself does once it has one.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported file format")]
    UnsupportedFormat,
}

/// The time domain a run drives its simulator over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    /// Free-form real-valued time, for `DEVSimulator`.
    Real,
    /// Integer tick time, for `ABMSimulator`.
    Tick,
}

fn default_time_unit() -> TimeUnit {
    TimeUnit::Real
}

fn default_priority() -> Priority {
    Priority::Default
}

/// Parameters a caller loads to configure one simulation run.
///
/// This does not reach into the engine itself — it is a plain data record a
/// caller's own setup code reads before constructing a `Simulator`, seeding
/// an RNG, and scheduling its own events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Seed for a `desim_core::SimRng` driving this run's randomness.
    pub seed: u64,

    /// Starting point on the simulator's clock. Almost always zero, since
    /// `Simulator::setup` requires the model's clock to read `T::ZERO`;
    /// kept explicit so a config file documents the run's intent.
    #[serde(default)]
    pub start_time: f64,

    /// Upper bound passed to `run_until`/`run_for`. `None` means the caller
    /// decides how long to run at call time rather than from config.
    #[serde(default)]
    pub end_time: Option<f64>,

    /// Which simulator flavor (and therefore clock domain) this run targets.
    #[serde(default = "default_time_unit")]
    pub time_unit: TimeUnit,

    /// Priority newly scheduled events should default to, absent a more
    /// specific choice at the call site.
    #[serde(default = "default_priority")]
    pub default_priority: Priority,
}

impl RunConfig {
    /// Load from a `.yaml`/`.yml` or `.json` file, dispatching on extension.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        if !(path.ends_with(".yaml") || path.ends_with(".yml") || path.ends_with(".json")) {
            return Err(ConfigError::UnsupportedFormat);
        }

        let content = std::fs::read_to_string(path)?;
        if path.ends_with(".json") {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_minimal_yaml_with_defaults() {
        let yaml = "seed: 42\n";
        let config = RunConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.start_time, 0.0);
        assert_eq!(config.end_time, None);
        assert_eq!(config.time_unit, TimeUnit::Real);
        assert_eq!(config.default_priority, Priority::Default);
    }

    #[test]
    fn loads_full_json() {
        let json = r#"{
            "seed": 7,
            "start_time": 0.0,
            "end_time": 100.0,
            "time_unit": "tick",
            "default_priority": "high"
        }"#;
        let config = RunConfig::from_json(json).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.end_time, Some(100.0));
        assert_eq!(config.time_unit, TimeUnit::Tick);
        assert_eq!(config.default_priority, Priority::High);
    }

    #[test]
    fn from_file_rejects_unknown_extension() {
        let err = RunConfig::from_file("config.toml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat));
    }

    #[test]
    fn malformed_yaml_surfaces_as_yaml_error() {
        let err = RunConfig::from_yaml("seed: [unterminated").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }
}
