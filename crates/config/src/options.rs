//! Recorder options
//!
//! Global knobs that change how derived series are reconciled.
//!
//! # Example
//!
//! ```toml
//! [options]
//! ttl = "1d"
//! ```

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::ConfigError;

/// Default liveness lookback
pub const DEFAULT_TTL: &str = "1d";

/// One integer followed by exactly one Prometheus duration unit
static TTL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(y|w|d|h|m|s|ms)$").unwrap());

/// Liveness lookback window, kept in Prometheus duration syntax
///
/// Only single-unit durations are accepted (`10h`, `5d`, `500ms`). Composite
/// forms such as `1h30m` are rejected even though recent Prometheus versions
/// understand them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Ttl(String);

impl Ttl {
    /// The duration exactly as written in PromQL range selectors
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Ttl {
    fn default() -> Self {
        Self(DEFAULT_TTL.to_string())
    }
}

impl FromStr for Ttl {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if TTL_PATTERN.is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(ConfigError::invalid_ttl(s))
        }
    }
}

impl TryFrom<String> for Ttl {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Options section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OptionsConfig {
    /// Lookback used to decide whether a vanished input series is still alive
    /// Default: 1d
    pub ttl: Ttl,
}
