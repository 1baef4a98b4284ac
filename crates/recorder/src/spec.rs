//! Derived metric description and series identity

use std::fmt;

use sleeker_backend::Series;
use sleeker_config::{DEFAULT_AGGREGATION_OPERATION, MetricConfig, normalize_output};

/// Immutable description of one derived counter
///
/// Built once at startup. The output name always carries the `_total`
/// suffix, so queries and exposition agree on the series name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSpec {
    input: String,
    output: String,
    description: String,
    filtering: Option<String>,
    aggregation_labels: Vec<String>,
    aggregation_operation: String,
}

impl MetricSpec {
    /// Create a spec aggregating `input` with `sum` and no labels
    pub fn new(input: impl Into<String>, output: impl AsRef<str>) -> Self {
        Self {
            input: input.into(),
            output: normalize_output(output.as_ref()),
            description: String::new(),
            filtering: None,
            aggregation_labels: Vec::new(),
            aggregation_operation: DEFAULT_AGGREGATION_OPERATION.to_string(),
        }
    }

    /// Build from one `[[metrics]]` entry
    pub fn from_config(config: &MetricConfig) -> Self {
        Self::new(config.input.as_str(), &config.output)
            .with_description(config.description.as_str())
            .with_labels(config.aggregation_labels.iter().cloned())
            .with_operation(config.aggregation_operation.as_str())
            .with_filtering(config.filtering.clone())
    }

    /// Set the help text
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the group-by labels, in order
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aggregation_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Set the aggregation verb
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.aggregation_operation = operation.into();
        self
    }

    /// Set the selector fragment appended to the input
    pub fn with_filtering(mut self, filtering: Option<String>) -> Self {
        self.filtering = filtering.filter(|f| !f.is_empty());
        self
    }

    /// Raw input expression
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Normalized output name
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Help text, falling back to the output name
    pub fn help(&self) -> &str {
        if self.description.is_empty() {
            &self.output
        } else {
            &self.description
        }
    }

    /// Selector fragment, empty when unset
    pub fn filtering(&self) -> &str {
        self.filtering.as_deref().unwrap_or("")
    }

    /// Group-by labels
    pub fn labels(&self) -> &[String] {
        &self.aggregation_labels
    }

    /// Aggregation verb
    pub fn operation(&self) -> &str {
        &self.aggregation_operation
    }

    /// Identity of `series` under this spec's aggregation labels
    ///
    /// Labels outside the aggregation set are ignored; missing ones become
    /// the empty string.
    pub fn key(&self, series: &Series) -> LabelKey {
        LabelKey(
            self.aggregation_labels
                .iter()
                .map(|name| series.label(name).to_string())
                .collect(),
        )
    }

    /// Render `key` as a selector for log messages
    pub fn selector<'a>(&'a self, key: &'a LabelKey) -> Selector<'a> {
        Selector { spec: self, key }
    }
}

/// Label values in aggregation-label order
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelKey(Vec<String>);

impl LabelKey {
    /// Create a key from values in aggregation-label order
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(values.into_iter().map(Into::into).collect())
    }

    /// Values as string slices
    pub fn values(&self) -> Vec<&str> {
        self.0.iter().map(String::as_str).collect()
    }
}

/// `output{a="1",b="foo"}` display of one series
pub struct Selector<'a> {
    spec: &'a MetricSpec,
    key: &'a LabelKey,
}

impl fmt::Display for Selector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.spec.output)?;
        for (i, (name, value)) in self.spec.aggregation_labels.iter().zip(&self.key.0).enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}=\"{}\"", name, value)?;
        }
        f.write_str("}")
    }
}
