//! Recorder orchestration
//!
//! Drives the engine through its three states:
//!
//! - **Starting**: reconcile every metric concurrently and commit only if
//!   all of them succeeded; otherwise wait with linear backoff and retry.
//! - **Running**: tick every metric concurrently on a drift-free schedule.
//!   A failing metric is logged and skipped for that cycle only.
//! - **Stopping**: cancellation is observed between cycles; an in-flight
//!   cycle always completes.

use futures_util::future::join_all;
use sleeker_backend::Backend;
use sleeker_config::{Config, SchedulerConfig, Ttl};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::{RecorderError, Result};
use crate::exposition::Exposition;
use crate::metric::Metric;
use crate::reconcile::{CatchupWindow, reconcile};
use crate::schedule::{Schedule, unix_now};
use crate::spec::MetricSpec;
use crate::stats::RecorderStats;
use crate::tick::tick as tick_metric;

/// Timing and reconciliation knobs
#[derive(Debug, Clone, Default)]
pub struct RecorderSettings {
    /// Tick interval, retry backoff and catch-up window
    pub scheduler: SchedulerConfig,
    /// Liveness lookback for vanished series
    pub ttl: Ttl,
}

impl RecorderSettings {
    /// Settings from a loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            scheduler: config.scheduler.clone(),
            ttl: config.options.ttl.clone(),
        }
    }
}

/// Keeps a set of derived counters in step with their inputs
pub struct Recorder<B> {
    backend: B,
    metrics: Vec<Metric>,
    settings: RecorderSettings,
    stats: RecorderStats,
}

impl<B: Backend> Recorder<B> {
    /// Register one counter per spec, plus the self-metrics, in `exposition`
    ///
    /// # Errors
    ///
    /// Returns error if a counter cannot be registered.
    pub fn new(
        backend: B,
        specs: impl IntoIterator<Item = MetricSpec>,
        exposition: &Exposition,
        settings: RecorderSettings,
    ) -> Result<Self> {
        let metrics = specs
            .into_iter()
            .map(|spec| Metric::register(spec, exposition))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let stats = RecorderStats::register(exposition)?;

        Ok(Self {
            backend,
            metrics,
            settings,
            stats,
        })
    }

    /// Build a recorder for every `[[metrics]]` entry of `config`
    ///
    /// # Errors
    ///
    /// Returns error if a counter cannot be registered.
    pub fn from_config(backend: B, config: &Config, exposition: &Exposition) -> Result<Self> {
        Self::new(
            backend,
            config.metrics.iter().map(MetricSpec::from_config),
            exposition,
            RecorderSettings::from_config(config),
        )
    }

    /// Managed metrics
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Active settings
    pub fn settings(&self) -> &RecorderSettings {
        &self.settings
    }

    /// Reconcile every metric at `timestamp` and commit all or nothing
    ///
    /// # Errors
    ///
    /// Returns the first failure if any metric could not be reconciled. Every
    /// failure is logged, and no counter or previous value is touched.
    pub async fn load(&mut self, timestamp: f64) -> Result<()> {
        let window = CatchupWindow::from_config(&self.settings.scheduler);
        let backend = &self.backend;
        let ttl = &self.settings.ttl;

        let results = join_all(
            self.metrics
                .iter()
                .map(|metric| reconcile(&metric.spec, backend, timestamp, &window, ttl)),
        )
        .await;

        let mut plans = Vec::with_capacity(results.len());
        let mut failure = None;
        for (metric, result) in self.metrics.iter().zip(results) {
            match result {
                Ok(plan) => plans.push(plan),
                Err(e) => {
                    error!(
                        metric = %metric.name(),
                        error = %e,
                        timeout = e.is_timeout(),
                        "reconciliation failed"
                    );
                    failure.get_or_insert(e);
                }
            }
        }

        self.stats.load_attempt(failure.is_none());
        if let Some(e) = failure {
            return Err(e);
        }

        for (metric, plan) in self.metrics.iter_mut().zip(plans) {
            info!(metric = %metric.name(), series = plan.len(), "metric loaded");
            metric.commit(plan);
        }
        Ok(())
    }

    /// Load with retry until it succeeds or `cancel` fires
    ///
    /// Returns the tick schedule anchored at the successful load.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Cancelled`] on shutdown, or any error that
    /// retrying cannot fix.
    pub async fn start(&mut self, cancel: &CancellationToken) -> Result<Schedule> {
        let mut attempt: u32 = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(RecorderError::Cancelled);
            }

            let origin = Instant::now();
            let timestamp = unix_now();
            match self.load(timestamp).await {
                Ok(()) => {
                    info!(timestamp, attempts = attempt + 1, "loading done");
                    return Ok(Schedule::new(
                        origin,
                        timestamp,
                        self.settings.scheduler.interval,
                    ));
                }
                Err(e) if e.is_retryable() => {
                    let delay = self.settings.scheduler.retry_delay(attempt);
                    error!(
                        error = %e,
                        timeout = e.is_timeout(),
                        attempt = attempt + 1,
                        retry_in = ?delay,
                        "initial load failed, retrying"
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(RecorderError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                    attempt = attempt.saturating_add(1);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Tick every metric at `timestamp`
    ///
    /// Returns the number of metrics that failed; their state is untouched
    /// and they are retried on the next cycle.
    pub async fn tick(&mut self, timestamp: f64) -> usize {
        let started = Instant::now();
        let backend = &self.backend;

        let results = join_all(
            self.metrics
                .iter_mut()
                .map(|metric| tick_metric(metric, backend, timestamp)),
        )
        .await;

        let mut failed = 0;
        for (metric, result) in self.metrics.iter().zip(results) {
            match result {
                Ok(summary) => {
                    self.stats.tick(metric.name(), true);
                    debug!(
                        metric = %metric.name(),
                        updated = summary.updated,
                        new_series = summary.new_series,
                        resets = summary.resets,
                        skipped = summary.skipped,
                        "metric ticked"
                    );
                }
                Err(e) => {
                    failed += 1;
                    self.stats.tick(metric.name(), false);
                    error!(
                        metric = %metric.name(),
                        error = %e,
                        timeout = e.is_timeout(),
                        "tick failed, skipping metric"
                    );
                }
            }
        }

        self.stats.cycle(started.elapsed());
        failed
    }

    /// Load, then tick on schedule until `cancel` fires
    ///
    /// # Errors
    ///
    /// Returns error only if loading fails in a way retrying cannot fix.
    /// Shutdown, including during the initial load, returns `Ok`.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<()> {
        info!(
            backend = self.backend.name(),
            metrics = self.metrics.len(),
            "recorder starting"
        );

        let mut schedule = match self.start(&cancel).await {
            Ok(schedule) => schedule,
            Err(RecorderError::Cancelled) => {
                info!("shutdown requested before initial load completed");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        info!(interval = ?schedule.interval(), "recorder running");

        loop {
            let deadline = schedule.next_deadline();
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("recorder shutting down");
                    break;
                }
                _ = tokio::time::sleep_until(deadline.at) => {
                    self.tick(deadline.timestamp).await;
                }
            }
        }

        Ok(())
    }
}
