//! Last observed input value per series

use std::collections::HashMap;

use crate::spec::LabelKey;

/// Last raw input value seen for each series of one metric
///
/// An entry exists once the series has been observed by a reconciliation or
/// a tick. Entries are never removed: the key space is bounded by the label
/// cardinality of the aggregated input, which the exposition keeps forever
/// as well.
#[derive(Debug, Clone, Default)]
pub struct PreviousValueTable {
    values: HashMap<LabelKey, f64>,
}

impl PreviousValueTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value recorded for `key`
    pub fn get(&self, key: &LabelKey) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Record `value` as the last seen input for `key`
    pub fn record(&mut self, key: LabelKey, value: f64) {
        self.values.insert(key, value);
    }

    /// Number of tracked series
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no series has been observed yet
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_overwrites() {
        let mut table = PreviousValueTable::new();
        let key = LabelKey::new(["1", "foo"]);
        assert_eq!(table.get(&key), None);

        table.record(key.clone(), 4.0);
        table.record(key.clone(), 2.0);

        assert_eq!(table.get(&key), Some(2.0));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_zero_is_a_recorded_value() {
        let mut table = PreviousValueTable::new();
        let key = LabelKey::new(["a"]);
        table.record(key.clone(), 0.0);
        assert_eq!(table.get(&key), Some(0.0));
        assert!(!table.is_empty());
    }
}
