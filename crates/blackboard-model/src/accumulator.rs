//! Per-field collection of raw values contributed by many data sets

use crate::dataset::DataSet;
use crate::descriptor::reference_key;
use blackboard_expr::Value;
use indexmap::IndexMap;

/// Multi-map from field reference to the values submitted for it
#[derive(Debug, Clone, Default)]
pub struct DataSetValueAccumulator {
    values: IndexMap<String, Vec<Value>>,
}

impl DataSetValueAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, reference: &str, value: Value) {
        self.values.entry(reference_key(reference)).or_default().push(value);
    }

    /// Add every stored value of a data set
    pub fn add_all(&mut self, dataset: &DataSet) {
        for entry in dataset.values() {
            self.add(&entry.reference, entry.value.clone());
        }
    }

    /// Values accumulated for a field, in submission order
    pub fn values(&self, reference: &str) -> &[Value] {
        self.values
            .get(&reference_key(reference))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
