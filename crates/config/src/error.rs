//! Configuration error types

use std::io;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading or validating configuration
///
/// Every variant is fatal: the recorder refuses to start with an invalid
/// configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("failed to read config file '{path}': {source}")]
    IoError {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// TTL is not a single-unit Prometheus duration
    #[error(
        "invalid ttl format '{value}': it must match a Prometheus time duration with a single unit (e.g. 1d, 12h, 30m)"
    )]
    InvalidTtl {
        /// The rejected value
        value: String,
    },

    /// Validation error - required field missing or empty
    #[error("{component} '{name}' is missing required field '{field}'")]
    MissingField {
        /// Component type (e.g., "metric")
        component: &'static str,
        /// Name of the component
        name: String,
        /// Missing field name
        field: &'static str,
    },

    /// Validation error - invalid value
    #[error("{component} '{name}' has invalid {field}: {message}")]
    InvalidValue {
        /// Component type
        component: &'static str,
        /// Name of the component
        name: String,
        /// Field name
        field: &'static str,
        /// Error message
        message: String,
    },

    /// Two metrics normalize to the same output counter
    #[error("output '{output}' is declared by more than one metric")]
    DuplicateOutput {
        /// Normalized output name
        output: String,
    },

    /// No metrics configured
    #[error("no metrics are configured - at least one [[metrics]] entry is required")]
    NoMetrics,
}

impl ConfigError {
    /// Create an InvalidTtl error
    pub fn invalid_ttl(value: impl Into<String>) -> Self {
        Self::InvalidTtl {
            value: value.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(
        component: &'static str,
        name: impl Into<String>,
        field: &'static str,
    ) -> Self {
        Self::MissingField {
            component,
            name: name.into(),
            field,
        }
    }

    /// Create an InvalidValue error
    pub fn invalid_value(
        component: &'static str,
        name: impl Into<String>,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            component,
            name: name.into(),
            field,
            message: message.into(),
        }
    }

    /// Create a DuplicateOutput error
    pub fn duplicate_output(output: impl Into<String>) -> Self {
        Self::DuplicateOutput {
            output: output.into(),
        }
    }
}
