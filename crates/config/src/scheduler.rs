//! Scheduler configuration
//!
//! Timing of the startup reconciliation and of the steady-state ticks.
//!
//! # Defaults
//!
//! - `interval`: 5s between ticks
//! - `retry_initial` / `retry_step`: startup retries wait 5s, 10s, 15s, ...
//! - `catchup_window` / `catchup_step`: 6h of history at 15s resolution
//!   (1440 points per series, well under the Prometheus limit)

use serde::Deserialize;
use std::time::Duration;

/// Prometheus refuses range queries returning more points per series
pub const MAX_POINTS_PER_SERIES: u64 = 11_000;

/// Scheduler timing configuration
///
/// # Example
///
/// ```toml
/// [scheduler]
/// interval = "5s"
/// retry_initial = "5s"
/// retry_step = "5s"
/// catchup_window = "6h"
/// catchup_step = "15s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Time between two ticks
    /// Default: 5s
    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    /// Wait before the first startup retry
    /// Default: 5s
    #[serde(with = "humantime_serde")]
    pub retry_initial: Duration,

    /// Added to the wait after every failed startup attempt
    /// Default: 5s
    #[serde(with = "humantime_serde")]
    pub retry_step: Duration,

    /// History scanned when catching up after a restart
    /// Default: 6h
    #[serde(with = "humantime_serde")]
    pub catchup_window: Duration,

    /// Resolution of the catch-up range queries
    /// Default: 15s
    #[serde(with = "humantime_serde")]
    pub catchup_step: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            retry_initial: Duration::from_secs(5),
            retry_step: Duration::from_secs(5),
            catchup_window: Duration::from_secs(6 * 60 * 60),
            catchup_step: Duration::from_secs(15),
        }
    }
}

impl SchedulerConfig {
    /// Number of points each catch-up range query returns per series
    pub fn catchup_points(&self) -> u64 {
        let step = self.catchup_step.as_millis().max(1);
        (self.catchup_window.as_millis() / step) as u64
    }

    /// Wait before retry number `attempt` (0-based), growing linearly
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        self.retry_initial + self.retry_step * attempt
    }
}
