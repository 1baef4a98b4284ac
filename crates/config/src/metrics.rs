//! Derived metric declarations
//!
//! Each `[[metrics]]` entry describes one counter the recorder republishes.
//!
//! # Example
//!
//! ```toml
//! [[metrics]]
//! input = "http_requests_total"
//! output = "http_requests_by_service"     # exposed as http_requests_by_service_total
//! description = "Requests per service and status code"
//! filtering = '{env="prod"}'
//! aggregation_labels = ["service", "code"]
//! aggregation_operation = "sum"           # default
//! ```

use serde::Deserialize;

/// Suffix Prometheus conventionally gives to counters
pub const COUNTER_SUFFIX: &str = "_total";

/// Default aggregation verb
pub const DEFAULT_AGGREGATION_OPERATION: &str = "sum";

/// Append the counter suffix unless already present
///
/// Idempotent: `normalize_output("a_total") == "a_total"`.
pub fn normalize_output(output: &str) -> String {
    if output.ends_with(COUNTER_SUFFIX) {
        output.to_string()
    } else {
        format!("{output}{COUNTER_SUFFIX}")
    }
}

/// One derived metric as written in the config file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetricConfig {
    /// Expression selecting the raw input counter
    #[serde(alias = "base")]
    pub input: String,

    /// Name of the republished counter
    #[serde(alias = "name")]
    pub output: String,

    /// Help text of the republished counter
    #[serde(default)]
    pub description: String,

    /// Label selector fragment appended to `input`, e.g. `{job="api"}`
    #[serde(default)]
    pub filtering: Option<String>,

    /// Labels kept by the aggregation, in order
    pub aggregation_labels: Vec<String>,

    /// Aggregation verb (sum, max, ...)
    #[serde(default = "default_operation")]
    pub aggregation_operation: String,
}

fn default_operation() -> String {
    DEFAULT_AGGREGATION_OPERATION.to_string()
}

impl MetricConfig {
    /// Normalized output counter name
    pub fn output_name(&self) -> String {
        normalize_output(&self.output)
    }
}
