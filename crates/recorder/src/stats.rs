//! Recorder self-metrics
//!
//! Exposed next to the derived counters so operators can watch load retries
//! and per-metric tick failures.

use std::time::Duration;

use prometheus::{CounterVec, Histogram, HistogramOpts, Opts};

use crate::exposition::Exposition;

const TICK_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0];

const RESULT_OK: &str = "ok";
const RESULT_ERROR: &str = "error";

/// Counters and timings describing the recorder itself
#[derive(Clone)]
pub struct RecorderStats {
    load_attempts: CounterVec,
    ticks: CounterVec,
    tick_duration: Histogram,
}

impl RecorderStats {
    /// Create the self-metrics and register them with `exposition`
    ///
    /// # Errors
    ///
    /// Returns error if the names are already registered.
    pub fn register(exposition: &Exposition) -> Result<Self, prometheus::Error> {
        let load_attempts = CounterVec::new(
            Opts::new(
                "sleeker_load_attempts_total",
                "Initial load attempts by result",
            ),
            &["result"],
        )?;
        let ticks = CounterVec::new(
            Opts::new("sleeker_ticks_total", "Metric ticks by metric and result"),
            &["metric", "result"],
        )?;
        let tick_duration = Histogram::with_opts(
            HistogramOpts::new(
                "sleeker_tick_duration_seconds",
                "Duration of one tick cycle over all metrics",
            )
            .buckets(TICK_BUCKETS.to_vec()),
        )?;

        exposition.register(Box::new(load_attempts.clone()))?;
        exposition.register(Box::new(ticks.clone()))?;
        exposition.register(Box::new(tick_duration.clone()))?;

        Ok(Self {
            load_attempts,
            ticks,
            tick_duration,
        })
    }

    /// Count one load attempt
    pub fn load_attempt(&self, ok: bool) {
        self.load_attempts
            .with_label_values(&[result_label(ok)])
            .inc();
    }

    /// Count one tick of `metric`
    pub fn tick(&self, metric: &str, ok: bool) {
        self.ticks.with_label_values(&[metric, result_label(ok)]).inc();
    }

    /// Record the duration of one tick cycle
    pub fn cycle(&self, elapsed: Duration) {
        self.tick_duration.observe(elapsed.as_secs_f64());
    }
}

fn result_label(ok: bool) -> &'static str {
    if ok { RESULT_OK } else { RESULT_ERROR }
}
