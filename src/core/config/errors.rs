//! Configuration errors and validation traits.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field holds a value outside its accepted range.
    #[error("invalid value for '{field}': {message}")]
    InvalidValue {
        /// Name of the offending field.
        field: String,
        /// Description of the accepted range.
        message: String,
    },

    /// The configuration file could not be read.
    #[error("failed to read config file '{path}'")]
    Read {
        /// Path of the configuration file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for the expected schema.
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        /// Path of the configuration file.
        path: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Creates an [`ConfigError::InvalidValue`] error.
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Trait for configuration types that can check their own invariants.
pub trait ConfigValidator {
    /// Validates the configuration, returning the first violated constraint.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Validates that a ratio lies in `(0, 1]`.
    fn validate_ratio(&self, field: &str, value: f32) -> Result<(), ConfigError> {
        if value.is_finite() && value > 0.0 && value <= 1.0 {
            Ok(())
        } else {
            Err(ConfigError::invalid_value(
                field,
                format!("expected a value in (0, 1], got {value}"),
            ))
        }
    }

    /// Validates that a count is strictly positive.
    fn validate_positive_count(&self, field: &str, value: usize) -> Result<(), ConfigError> {
        if value > 0 {
            Ok(())
        } else {
            Err(ConfigError::invalid_value(field, "expected a positive count"))
        }
    }
}
