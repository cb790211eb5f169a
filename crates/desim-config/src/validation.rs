//! Validation for a loaded [`RunConfig`](crate::config::RunConfig)

use crate::config::RunConfig;
use std::fmt;

/// Path to a configuration field (e.g. `"run.end_time"`).
#[derive(Debug, Clone)]
pub struct FieldPath(pub String);

impl FieldPath {
    pub fn new(path: &str) -> Self {
        Self(path.to_string())
    }

    pub fn field(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}.{}", self.0, name))
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Detailed validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub path: FieldPath,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(path: FieldPath, kind: ValidationErrorKind) -> Self {
        Self { path, kind }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.path, self.kind)
    }
}

#[derive(Debug, Clone)]
pub enum ValidationErrorKind {
    ValueMustBeNonNegative { field: String, value: f64 },
    EndBeforeStart { start: f64, end: f64 },
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValueMustBeNonNegative { field, value } => {
                write!(f, "{} must be non-negative, got {}", field, value)
            }
            Self::EndBeforeStart { start, end } => {
                write!(f, "end_time ({}) is before start_time ({})", end, start)
            }
        }
    }
}

/// Validate a [`RunConfig`], returning every violation found rather than
/// stopping at the first.
pub fn validate_run_config(config: &RunConfig) -> Result<(), Vec<ValidationError>> {
    let root = FieldPath::new("run");
    let mut errors = Vec::new();

    if config.start_time < 0.0 {
        errors.push(ValidationError::new(
            root.field("start_time"),
            ValidationErrorKind::ValueMustBeNonNegative {
                field: "start_time".to_string(),
                value: config.start_time,
            },
        ));
    }

    if let Some(end_time) = config.end_time {
        if end_time < config.start_time {
            errors.push(ValidationError::new(
                root.field("end_time"),
                ValidationErrorKind::EndBeforeStart {
                    start: config.start_time,
                    end: end_time,
                },
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimeUnit;
    use desim_core::Priority;

    fn base_config() -> RunConfig {
        RunConfig {
            seed: 1,
            start_time: 0.0,
            end_time: Some(10.0),
            time_unit: TimeUnit::Real,
            default_priority: Priority::Default,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(validate_run_config(&base_config()).is_ok());
    }

    #[test]
    fn negative_start_time_rejected() {
        let mut config = base_config();
        config.start_time = -1.0;
        let errors = validate_run_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(&e.kind, ValidationErrorKind::ValueMustBeNonNegative { .. })));
    }

    #[test]
    fn end_before_start_rejected() {
        let mut config = base_config();
        config.start_time = 5.0;
        config.end_time = Some(1.0);
        let errors = validate_run_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(&e.kind, ValidationErrorKind::EndBeforeStart { .. })));
    }
}
