//! Load phase: reconstruct derived counters after a gap
//!
//! At startup the exposition registry is empty, but the backend still holds
//! the derived counter as it was last scraped. Reconciliation reads that
//! last value back, adds whatever the input counter gained since then, and
//! plans the result as the starting increment of each series.
//!
//! Reconciliation only plans. Nothing is applied until every metric has
//! reconciled successfully, see [`Recorder::load`](crate::Recorder::load).

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use sleeker_backend::{Backend, QueryRequest, Sample};
use sleeker_config::{SchedulerConfig, Ttl};
use tracing::{debug, warn};

use crate::error::{RecorderError, Result};
use crate::query::{aggregation_query, liveness_query, recatch_query};
use crate::spec::{LabelKey, MetricSpec};

/// Range read at startup: `[timestamp - span, timestamp]` every `step`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatchupWindow {
    /// How far back to look
    pub span: Duration,
    /// Resolution of the range queries
    pub step: Duration,
}

impl CatchupWindow {
    /// Create a window
    pub fn new(span: Duration, step: Duration) -> Self {
        Self { span, step }
    }

    /// Window from the `[scheduler]` section
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(config.catchup_window, config.catchup_step)
    }

    /// First timestamp of a window ending at `end`
    pub fn start(&self, end: f64) -> f64 {
        end - self.span.as_secs_f64()
    }
}

impl Default for CatchupWindow {
    fn default() -> Self {
        Self::from_config(&SchedulerConfig::default())
    }
}

/// Starting state of one derived series
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedSeries {
    /// Series identity
    pub key: LabelKey,
    /// Amount to add to the freshly registered counter
    pub increment: f64,
    /// Last input value seen in the window, if the input was observed
    pub previous_input: Option<f64>,
}

/// Reconciliation result for one metric
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadPlan {
    /// Planned series, ordered by key
    pub series: Vec<PlannedSeries>,
}

impl LoadPlan {
    /// Planned series for `key`
    pub fn get(&self, key: &LabelKey) -> Option<&PlannedSeries> {
        self.series.iter().find(|series| &series.key == key)
    }

    /// Number of planned series
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Whether nothing will be restored
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Sum of input increases over the samples at or after `since`
///
/// A decrease between two samples is a reset: the counter restarted from
/// zero, so the later value is the whole increase. Whatever the counter
/// gained between the previous sample and the reset is lost. Non-finite
/// samples are ignored.
pub fn catchup(samples: &[Sample], since: f64) -> f64 {
    let kept: Vec<f64> = samples
        .iter()
        .filter(|sample| sample.timestamp >= since && sample.value.is_finite())
        .map(|sample| sample.value)
        .collect();

    kept.windows(2)
        .map(|pair| {
            if pair[1] >= pair[0] {
                pair[1] - pair[0]
            } else {
                pair[1]
            }
        })
        .sum()
}

/// Plan the starting state of `spec`'s series at `timestamp`
///
/// Queries run sequentially: the derived counter's own history, then the
/// aggregated input over the same window, then (only if some derived series
/// has no input in the window) one liveness check over `ttl`.
///
/// # Errors
///
/// Returns [`RecorderError::Backend`] if any query fails.
pub async fn reconcile<B: Backend>(
    spec: &MetricSpec,
    backend: &B,
    timestamp: f64,
    window: &CatchupWindow,
    ttl: &Ttl,
) -> Result<LoadPlan> {
    let start = window.start(timestamp);
    let fetch = move |request: QueryRequest| async move {
        backend
            .fetch(&request)
            .await
            .map_err(|e| RecorderError::backend(spec.output(), e))
    };

    // Last exposed value of every derived series
    let mut recatch: BTreeMap<LabelKey, Sample> = BTreeMap::new();
    let rows = fetch(QueryRequest::range(
        recatch_query(spec),
        start,
        timestamp,
        window.step,
    ))
    .await?;
    for row in &rows {
        let Some(last) = row.last() else {
            continue;
        };
        let key = spec.key(row);
        debug!(
            series = %spec.selector(&key),
            timestamp = last.timestamp,
            value = last.value,
            "found derived sample"
        );
        recatch
            .entry(key)
            .and_modify(|current| {
                if last.timestamp > current.timestamp {
                    *current = last;
                }
            })
            .or_insert(last);
    }

    let mut plan = LoadPlan::default();

    let rows = fetch(QueryRequest::range(
        aggregation_query(spec),
        start,
        timestamp,
        window.step,
    ))
    .await?;
    for row in &rows {
        let key = spec.key(row);
        let Some(last) = recatch.remove(&key) else {
            debug!(
                series = %spec.selector(&key),
                "input series has no derived history, leaving it to the first tick"
            );
            continue;
        };

        let increase = catchup(&row.values, last.timestamp);
        debug!(
            series = %spec.selector(&key),
            value = last.value,
            catchup = increase,
            "catching up derived counter"
        );
        plan.series.push(PlannedSeries {
            previous_input: row.last().map(|sample| sample.value),
            increment: last.value + increase,
            key,
        });
    }

    if !recatch.is_empty() {
        let rows = fetch(QueryRequest::instant(liveness_query(spec, ttl), timestamp)).await?;
        let alive: HashSet<LabelKey> = rows
            .iter()
            .filter(|row| row.value.is_some())
            .map(|row| spec.key(row))
            .collect();

        for (key, last) in recatch {
            if alive.contains(&key) {
                warn!(
                    series = %spec.selector(&key),
                    input = spec.input(),
                    ttl = %ttl,
                    "no base data found in catch-up window, keeping last derived value"
                );
                plan.series.push(PlannedSeries {
                    key,
                    increment: last.value,
                    previous_input: None,
                });
            } else {
                warn!(
                    series = %spec.selector(&key),
                    input = spec.input(),
                    ttl = %ttl,
                    "series dropped, input not seen within ttl"
                );
            }
        }
    }

    plan.series.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(plan)
}
