//! Drift-free tick schedule
//!
//! Deadlines are computed from a fixed origin rather than from the end of
//! the previous cycle, so slow cycles never accumulate lag: the k-th tick is
//! due at `origin + k * interval` and reads data at `origin_ts + k * interval`.

use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;

/// Current wall-clock time in whole unix seconds
pub fn unix_now() -> f64 {
    Utc::now().timestamp() as f64
}

/// Sequence of tick deadlines anchored at one origin
#[derive(Debug, Clone)]
pub struct Schedule {
    origin: Instant,
    origin_ts: f64,
    interval: Duration,
    ticks: u32,
}

/// One scheduled tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deadline {
    /// When the tick should fire
    pub at: Instant,
    /// Timestamp the tick reads data at
    pub timestamp: f64,
}

impl Schedule {
    /// Anchor a schedule at `origin`, which corresponds to `origin_ts`
    pub fn new(origin: Instant, origin_ts: f64, interval: Duration) -> Self {
        Self {
            origin,
            origin_ts,
            interval,
            ticks: 0,
        }
    }

    /// Interval between ticks
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Advance to the next tick
    pub fn next_deadline(&mut self) -> Deadline {
        self.ticks = self.ticks.saturating_add(1);
        let offset = self.interval * self.ticks;
        Deadline {
            at: self.origin + offset,
            timestamp: self.origin_ts + offset.as_secs_f64(),
        }
    }
}
