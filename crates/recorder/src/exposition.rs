//! Exposition sink
//!
//! Derived counters live in a [`prometheus::Registry`] owned by the process.
//! The registry starts empty at every launch, which is why reconciliation
//! expresses restored values as increments from zero.

use prometheus::core::Collector;
use prometheus::{CounterVec, Encoder, Opts, Registry, TextEncoder};
use tracing::warn;

use crate::spec::{LabelKey, MetricSpec};

/// Registry serving derived counters and recorder self-metrics
#[derive(Clone, Default)]
pub struct Exposition {
    registry: Registry,
}

impl Exposition {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an arbitrary collector
    ///
    /// # Errors
    ///
    /// Returns error if a collector with the same descriptor already exists.
    pub fn register(&self, collector: Box<dyn Collector>) -> Result<(), prometheus::Error> {
        self.registry.register(collector)
    }

    /// Register the derived counter described by `spec`
    ///
    /// # Errors
    ///
    /// Returns error if the name or a label is invalid or already registered.
    pub fn counter(&self, spec: &MetricSpec) -> Result<DerivedCounter, prometheus::Error> {
        let labels: Vec<&str> = spec.labels().iter().map(String::as_str).collect();
        let vec = CounterVec::new(Opts::new(spec.output(), spec.help()), &labels)?;
        self.registry.register(Box::new(vec.clone()))?;

        Ok(DerivedCounter {
            output: spec.output().to_string(),
            vec,
        })
    }

    /// Current value of counter `name` for exactly the label set `labels`
    #[cfg(test)]
    pub(crate) fn value(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        self.registry
            .gather()
            .iter()
            .filter(|family| family.get_name() == name)
            .flat_map(|family| family.get_metric())
            .find(|metric| {
                let pairs = metric.get_label();
                pairs.len() == labels.len()
                    && labels.iter().all(|(label, value)| {
                        pairs
                            .iter()
                            .any(|pair| pair.get_name() == *label && pair.get_value() == *value)
                    })
            })
            .map(|metric| metric.get_counter().get_value())
    }

    /// Render the registry in the Prometheus text format
    ///
    /// # Errors
    ///
    /// Returns error if a family cannot be encoded.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    /// Content type of [`encode`](Self::encode) output
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }
}

/// Monotonic, label-keyed counter exposed under one output name
#[derive(Clone)]
pub struct DerivedCounter {
    output: String,
    vec: CounterVec,
}

impl DerivedCounter {
    /// Add `amount` to the series identified by `key`
    ///
    /// The series is created on first use. Negative and NaN amounts would
    /// break monotonicity and are refused; returns whether the increment was
    /// applied.
    pub fn increment(&self, key: &LabelKey, amount: f64) -> bool {
        if amount.is_nan() || amount < 0.0 {
            warn!(
                metric = %self.output,
                labels = ?key.values(),
                amount,
                "refusing invalid counter increment"
            );
            return false;
        }

        match self.vec.get_metric_with_label_values(&key.values()) {
            Ok(counter) => {
                counter.inc_by(amount);
                true
            }
            Err(e) => {
                warn!(
                    metric = %self.output,
                    labels = ?key.values(),
                    error = %e,
                    "unable to resolve counter series"
                );
                false
            }
        }
    }
}
