//! Sleeker Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Only the `[[metrics]]` entries are mandatory; every section has defaults.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use sleeker_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str(r#"
//! [[metrics]]
//! input = "http_requests_total"
//! output = "requests_by_service"
//! aggregation_labels = ["service"]
//! "#).unwrap();
//! assert_eq!(config.metrics[0].output_name(), "requests_by_service_total");
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [log]
//! level = "info"
//!
//! [prometheus]
//! url = "http://localhost:9090"
//! timeout = "20s"
//!
//! [exporter]
//! port = 6200
//!
//! [scheduler]
//! interval = "5s"
//!
//! [options]
//! ttl = "1d"
//!
//! [[metrics]]
//! input = "http_requests_total"
//! output = "requests_by_service"
//! description = "Requests per service"
//! filtering = '{env="prod"}'
//! aggregation_labels = ["service", "code"]
//! aggregation_operation = "sum"
//! ```

mod error;
mod exporter;
mod logging;
mod metrics;
mod options;
mod prometheus;
mod scheduler;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use exporter::ExporterConfig;
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use metrics::{
    COUNTER_SUFFIX, DEFAULT_AGGREGATION_OPERATION, MetricConfig, normalize_output,
};
pub use options::{DEFAULT_TTL, OptionsConfig, Ttl};
pub use prometheus::PrometheusConfig;
pub use scheduler::{MAX_POINTS_PER_SERIES, SchedulerConfig};

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults, but validation requires
/// at least one metric.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Prometheus backend the series are read from
    pub prometheus: PrometheusConfig,

    /// Endpoint exposing the derived counters
    pub exporter: ExporterConfig,

    /// Tick and catch-up timing
    pub scheduler: SchedulerConfig,

    /// Reconciliation options
    pub options: OptionsConfig,

    /// Derived metrics
    pub metrics: Vec<MetricConfig>,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Called on every parse; call it again after overriding fields at runtime.
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
