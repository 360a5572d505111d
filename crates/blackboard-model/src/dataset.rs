//! Data sets: one submission of values against a protocol
//!
//! A [`DataSet`] is validated against its protocol on construction. An
//! invalid protocol leaves the data set unusable: it only carries the model
//! issues. Otherwise default values are populated, external values are added
//! with [`DataSet::add_value`] and [`DataSet::calculate`] runs the two-phase
//! pipeline:
//!
//! 1. warnings, then validity rules, of fields without a calculated expression
//! 2. stop if any of those rules failed
//! 3. calculated fields whose enabled-if holds, in protocol order
//! 4. warnings, then validity rules, of the fields calculated in step 3
//!
//! Issues accumulate across calls; use [`DataSet::clear_issues`] for a fresh
//! report.

use crate::conversion::Culture;
use crate::descriptor::{ExpressionKind, ValueDescriptor, reference_key};
use crate::evaluator::ExpressionEvaluator;
use crate::issue::{Issue, IssueCollection};
use crate::protocol::ProtocolDescriptor;
use blackboard_diagnostics::{BB0200, BB0300, BB0301, BB0302, BlackboardError, Result};
use blackboard_expr::{Engine, Value};
use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// A stored value of one field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSetValue {
    /// Reference of the owning field, as declared in the protocol
    pub reference: String,
    pub value: Value,
}

impl DataSetValue {
    pub fn new(reference: impl Into<String>, value: Value) -> Self {
        Self {
            reference: reference.into(),
            value,
        }
    }
}

/// Builder for [`DataSet`]
pub struct DataSetBuilder {
    protocol: Arc<ProtocolDescriptor>,
    culture: Culture,
    engine: Option<Arc<Engine>>,
    populate_defaults: bool,
}

impl DataSetBuilder {
    /// Culture used for conversions, including default population
    pub fn culture(mut self, culture: Culture) -> Self {
        self.culture = culture;
        self
    }

    /// Share an expression engine (and its parse cache)
    pub fn engine(mut self, engine: Arc<Engine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn populate_defaults(mut self, populate: bool) -> Self {
        self.populate_defaults = populate;
        self
    }

    pub fn build(self) -> DataSet {
        let mut dataset = DataSet {
            issues: IssueCollection::new(),
            usable: false,
            lookup: HashSet::new(),
            values: IndexMap::new(),
            dirty: false,
            culture: self.culture,
            engine: self.engine.unwrap_or_else(|| Arc::new(Engine::new())),
            protocol: self.protocol,
        };

        let model_issues = dataset.protocol.validate_model();
        if !model_issues.is_empty() {
            log::debug!(
                "protocol '{}' has {} model issue(s); data set is not usable",
                dataset.protocol.reference,
                model_issues.len()
            );
            dataset.issues.extend(model_issues);
            return dataset;
        }

        dataset.lookup = dataset
            .protocol
            .all_values()
            .into_iter()
            .map(|descriptor| reference_key(&descriptor.reference))
            .filter(|key| !key.is_empty())
            .collect();
        dataset.usable = true;

        if self.populate_defaults {
            dataset.populate_defaults();
        }
        dataset
    }
}

/// Values submitted against a protocol, with the issues found so far
pub struct DataSet {
    protocol: Arc<ProtocolDescriptor>,
    engine: Arc<Engine>,
    culture: Culture,
    usable: bool,
    lookup: HashSet<String>,
    values: IndexMap<String, DataSetValue>,
    dirty: bool,
    issues: IssueCollection,
}

impl DataSet {
    /// Data set with the invariant culture and default values populated
    pub fn new(protocol: Arc<ProtocolDescriptor>) -> Self {
        Self::builder(protocol).build()
    }

    pub fn builder(protocol: Arc<ProtocolDescriptor>) -> DataSetBuilder {
        DataSetBuilder {
            protocol,
            culture: Culture::invariant(),
            engine: None,
            populate_defaults: true,
        }
    }

    /// False when the protocol failed model validation
    pub fn is_usable(&self) -> bool {
        self.usable
    }

    pub fn protocol(&self) -> &Arc<ProtocolDescriptor> {
        &self.protocol
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    pub fn culture(&self) -> &Culture {
        &self.culture
    }

    pub fn set_culture(&mut self, culture: Culture) {
        if self.culture != culture {
            self.culture = culture;
            self.dirty = true;
        }
    }

    /// True when values changed since the last [`DataSet::calculate`]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn issues(&self) -> &IssueCollection {
        &self.issues
    }

    pub fn clear_issues(&mut self) {
        self.issues.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Stored entry of a field (case-insensitive reference)
    pub fn get(&self, reference: &str) -> Option<&DataSetValue> {
        self.values.get(&reference_key(reference))
    }

    /// Stored value of a field
    pub fn value(&self, reference: &str) -> Option<&Value> {
        self.get(reference).map(|entry| &entry.value)
    }

    /// Stored entries in protocol order
    pub fn values(&self) -> Vec<&DataSetValue> {
        self.protocol
            .all_values()
            .into_iter()
            .filter(|descriptor| !descriptor.reference.trim().is_empty())
            .filter_map(|descriptor| self.get(&descriptor.reference))
            .collect()
    }

    /// Store a value for the field with the given reference
    pub fn add_value(&mut self, reference: &str, value: impl Into<Value>) -> Result<&DataSetValue> {
        self.ensure_usable()?;
        let key = reference_key(reference);
        if key.is_empty() {
            return Err(BlackboardError::argument(BB0300, "Reference ID cannot be empty."));
        }
        if !self.lookup.contains(&key) {
            return Err(BlackboardError::argument(
                BB0301,
                format!(
                    "Value '{}' is not defined in protocol '{}'.",
                    reference.trim(),
                    self.protocol.reference
                ),
            ));
        }

        let protocol = Arc::clone(&self.protocol);
        let descriptor = protocol.find(&key).ok_or_else(|| {
            BlackboardError::argument(BB0301, format!("Value '{}' is not defined.", reference.trim()))
        })?;
        Ok(self.store(descriptor, value.into()))
    }

    /// Store a value for a descriptor of this data set's protocol
    pub fn add_value_for(&mut self, descriptor: &ValueDescriptor, value: impl Into<Value>) -> Result<&DataSetValue> {
        self.ensure_usable()?;
        if descriptor.reference.trim().is_empty() {
            return Err(BlackboardError::argument(BB0300, "Reference ID cannot be empty."));
        }

        let protocol = Arc::clone(&self.protocol);
        match protocol.find(&descriptor.reference) {
            Some(found) if found == descriptor => Ok(self.store(found, value.into())),
            _ => Err(BlackboardError::argument(
                BB0302,
                format!(
                    "Value '{}' does not belong to protocol '{}'.",
                    descriptor.reference, self.protocol.reference
                ),
            )),
        }
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.is_usable() {
            return Ok(());
        }
        Err(BlackboardError::model(
            BB0200,
            format!("Protocol '{}' has model errors.", self.protocol.reference),
        ))
    }

    pub(crate) fn store(&mut self, descriptor: &ValueDescriptor, value: Value) -> &DataSetValue {
        self.dirty = true;
        let entry = DataSetValue::new(descriptor.reference.clone(), value);
        match self.values.entry(reference_key(&descriptor.reference)) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(entry);
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(entry),
        }
    }

    /// Store an evaluated result; fields without a reference keep none
    fn store_result(&mut self, descriptor: &ValueDescriptor, value: Value) {
        if descriptor.reference.trim().is_empty() {
            return;
        }
        self.store(descriptor, value);
    }

    pub(crate) fn evaluate(&mut self, descriptor: &ValueDescriptor, kind: ExpressionKind) -> Option<Value> {
        self.evaluate_with(descriptor, kind, &[])
    }

    /// Evaluate with extra names bound ahead of the data set values
    pub(crate) fn evaluate_with(
        &mut self,
        descriptor: &ValueDescriptor,
        kind: ExpressionKind,
        constants: &[(&str, Value)],
    ) -> Option<Value> {
        let evaluator = constants.iter().fold(
            ExpressionEvaluator::new(&self.engine, &self.values, &self.culture),
            |evaluator, (name, value)| evaluator.with_constant(name, value.clone()),
        );
        evaluator.evaluate(descriptor, kind, &mut self.issues)
    }

    fn condition(&mut self, descriptor: &ValueDescriptor, kind: ExpressionKind) -> Option<bool> {
        let evaluator = ExpressionEvaluator::new(&self.engine, &self.values, &self.culture);
        evaluator.evaluate_condition(descriptor, kind, &mut self.issues)
    }

    fn populate_defaults(&mut self) {
        let protocol = Arc::clone(&self.protocol);
        for descriptor in protocol.all_values() {
            if !descriptor.has_expression(ExpressionKind::Default) {
                continue;
            }
            if let Some(value) = self.evaluate(descriptor, ExpressionKind::Default) {
                self.store_result(descriptor, value);
            }
        }
    }

    /// Validate and calculate
    pub fn calculate(&mut self) {
        if !self.is_usable() {
            log::debug!("skipping calculation of unusable data set");
            return;
        }

        let protocol = Arc::clone(&self.protocol);
        let (calculated, editable): (Vec<&ValueDescriptor>, Vec<&ValueDescriptor>) =
            protocol.all_values().into_iter().partition(|descriptor| descriptor.is_calculated());

        log::debug!("validating {} editable field(s)", editable.len());
        if !self.validate(&editable) {
            log::debug!("editable fields are not valid; calculated fields are not evaluated");
            return;
        }

        let mut enabled = Vec::with_capacity(calculated.len());
        for descriptor in calculated {
            if !self.is_enabled(descriptor) {
                continue;
            }
            if let Some(value) = self.evaluate(descriptor, ExpressionKind::Calculated) {
                self.store_result(descriptor, value);
            }
            enabled.push(descriptor);
        }

        log::debug!("validating {} calculated field(s)", enabled.len());
        self.validate(&enabled);
        self.dirty = false;
    }

    fn is_enabled(&mut self, descriptor: &ValueDescriptor) -> bool {
        if !descriptor.has_expression(ExpressionKind::EnabledIf) {
            return true;
        }
        self.condition(descriptor, ExpressionKind::EnabledIf).unwrap_or(false)
    }

    /// Warnings first, then validity rules. Returns false if any rule failed.
    fn validate(&mut self, fields: &[&ValueDescriptor]) -> bool {
        for descriptor in fields {
            if !descriptor.has_expression(ExpressionKind::WarningIf) {
                continue;
            }
            if self.condition(descriptor, ExpressionKind::WarningIf) == Some(true) {
                let message = self.rule_message(descriptor, &descriptor.warning_message);
                self.issues.push(Issue::warning(descriptor, message));
            }
        }

        let mut valid = true;
        for descriptor in fields {
            if !descriptor.has_expression(ExpressionKind::ValidIf) {
                continue;
            }
            if self.condition(descriptor, ExpressionKind::ValidIf) == Some(false) {
                let message = self.rule_message(descriptor, &descriptor.validation_message);
                self.issues.push(Issue::validation_error(descriptor, message));
                valid = false;
            }
        }
        valid
    }

    fn rule_message(&self, descriptor: &ValueDescriptor, explicit: &str) -> String {
        if !explicit.trim().is_empty() {
            return explicit.to_string();
        }
        let current = self
            .value(&descriptor.reference)
            .map(ToString::to_string)
            .unwrap_or_default();
        format!("Value '{}' for '{}' is not valid.", current, descriptor.reference)
    }
}

impl std::fmt::Debug for DataSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSet")
            .field("protocol", &self.protocol.reference)
            .field("culture", &self.culture.name)
            .field("values", &self.values)
            .field("dirty", &self.dirty)
            .field("issues", &self.issues)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::SectionDescriptor;

    fn protocol(values: Vec<ValueDescriptor>) -> Arc<ProtocolDescriptor> {
        let section = values
            .into_iter()
            .fold(SectionDescriptor::new("main"), SectionDescriptor::with_value);
        Arc::new(ProtocolDescriptor::new("test").with_section(section))
    }

    #[test]
    fn test_add_value_replaces_and_marks_dirty() {
        let mut dataset = DataSet::new(protocol(vec![ValueDescriptor::new("a")]));
        assert!(!dataset.is_dirty());

        dataset.add_value("A", 1).unwrap();
        let stored = dataset.add_value("a", 2).unwrap();
        assert_eq!(stored.reference, "a");
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.value("a"), Some(&Value::from(2)));
        assert!(dataset.is_dirty());
    }

    #[test]
    fn test_add_value_argument_errors() {
        let mut dataset = DataSet::new(protocol(vec![ValueDescriptor::new("a")]));
        assert_eq!(dataset.add_value(" ", 1).unwrap_err().code(), BB0300);
        assert_eq!(dataset.add_value("zz", 1).unwrap_err().code(), BB0301);

        let foreign = ValueDescriptor::new("a").with_valid_if("this > 0");
        assert_eq!(dataset.add_value_for(&foreign, 1).unwrap_err().code(), BB0302);
    }

    #[test]
    fn test_unusable_dataset() {
        let mut dataset = DataSet::new(protocol(vec![ValueDescriptor::new("a"), ValueDescriptor::new("A")]));
        assert!(!dataset.is_usable());
        assert_eq!(dataset.issues().len(), 1);
        assert!(dataset.add_value("a", 1).is_err());

        dataset.calculate();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_enabled_if_failure_disables_field() {
        let mut dataset = DataSet::new(protocol(vec![
            ValueDescriptor::calculated("c", "1").with_enabled_if("missing > 0"),
        ]));
        dataset.calculate();
        assert_eq!(dataset.value("c"), None);
        assert_eq!(dataset.issues().len(), 1);
    }

    #[test]
    fn test_synthesized_rule_message() {
        let mut dataset = DataSet::new(protocol(vec![ValueDescriptor::new("a").with_valid_if("this > 10")]));
        dataset.add_value("a", 3).unwrap();
        dataset.calculate();
        assert_eq!(dataset.issues().as_slice()[0].message, "Value '3' for 'a' is not valid.");
    }
}
