//! Per-metric runtime state

use tracing::debug;

use crate::exposition::{DerivedCounter, Exposition};
use crate::previous::PreviousValueTable;
use crate::reconcile::LoadPlan;
use crate::spec::MetricSpec;

/// One derived metric: its description, its last observed inputs and its
/// exposed counter
///
/// Each metric owns its state, so metrics can be ticked concurrently
/// without locking.
pub struct Metric {
    pub(crate) spec: MetricSpec,
    pub(crate) previous: PreviousValueTable,
    pub(crate) counter: DerivedCounter,
}

impl Metric {
    /// Register the counter for `spec` and start with an empty table
    ///
    /// # Errors
    ///
    /// Returns error if the output name is invalid or already registered.
    pub fn register(spec: MetricSpec, exposition: &Exposition) -> Result<Self, prometheus::Error> {
        let counter = exposition.counter(&spec)?;
        Ok(Self {
            spec,
            previous: PreviousValueTable::new(),
            counter,
        })
    }

    /// Description of this metric
    pub fn spec(&self) -> &MetricSpec {
        &self.spec
    }

    /// Last observed input values
    pub fn previous(&self) -> &PreviousValueTable {
        &self.previous
    }

    /// Output name
    pub fn name(&self) -> &str {
        self.spec.output()
    }

    /// Apply a reconciliation plan
    ///
    /// Starts each planned series at its reconciled value and primes the
    /// previous-value table where the input was observed.
    pub fn commit(&mut self, plan: LoadPlan) {
        for series in plan.series {
            debug!(
                series = %self.spec.selector(&series.key),
                value = series.increment,
                "restoring derived counter"
            );
            if !self.counter.increment(&series.key, series.increment) {
                continue;
            }
            if let Some(input) = series.previous_input {
                self.previous.record(series.key, input);
            }
        }
    }
}
