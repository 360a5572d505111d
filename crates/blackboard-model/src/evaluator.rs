//! Expression evaluation against the values of one data set
//!
//! Identifiers resolve, after `let`/projection bindings, in this order:
//!
//! 1. constants supplied by the caller (the aggregator binds `value` and `values`)
//! 2. `this`, an alias for the reference of the field being evaluated
//! 3. `required`, true when the current field has a stored value
//! 4. `name?`, the stored value of `name` or null when there is none
//! 5. the stored value of the referenced field
//!
//! Failures never escape: they are recorded as model errors against the
//! field that owns the expression.

use crate::conversion::{Culture, to_boolean, to_number_as};
use crate::dataset::DataSetValue;
use crate::descriptor::{ExpressionKind, TypeOfValue, ValueDescriptor, reference_key};
use crate::issue::{Issue, IssueCollection};
use blackboard_expr::{Engine, EvalResult, EvaluationContext, Resolver, Value};
use indexmap::IndexMap;
use std::fmt::Display;

const THIS: &str = "this";
const REQUIRED: &str = "required";
const MISSING_TOLERANT_SUFFIX: char = '?';

/// Evaluator bound to the values of one data set
pub struct ExpressionEvaluator<'a> {
    engine: &'a Engine,
    values: &'a IndexMap<String, DataSetValue>,
    culture: &'a Culture,
    constants: IndexMap<String, Value>,
}

impl<'a> ExpressionEvaluator<'a> {
    pub fn new(engine: &'a Engine, values: &'a IndexMap<String, DataSetValue>, culture: &'a Culture) -> Self {
        Self {
            engine,
            values,
            culture,
            constants: IndexMap::new(),
        }
    }

    /// Bind a name that takes precedence over data set values
    pub fn with_constant(mut self, name: &str, value: Value) -> Self {
        self.constants.insert(reference_key(name), value);
        self
    }

    /// Evaluate one expression slot of a field
    ///
    /// Returns `None` when the slot is blank or evaluation failed; failures
    /// are pushed to `issues` as model errors.
    pub fn evaluate(
        &self,
        descriptor: &ValueDescriptor,
        kind: ExpressionKind,
        issues: &mut IssueCollection,
    ) -> Option<Value> {
        let source = kind.text(descriptor);
        if source.trim().is_empty() {
            return None;
        }

        log::trace!("evaluating {} of '{}': {}", kind, descriptor.display_name(), source);
        let scope = FieldScope {
            evaluator: self,
            descriptor,
        };
        let result = self.engine.parse(source).and_then(|expr| {
            let mut ctx = EvaluationContext::new(&scope);
            Ok(self.engine.evaluate(&expr, &mut ctx)?)
        });

        match result {
            Ok(value) => Some(value),
            Err(error) => {
                report(issues, descriptor, kind, error);
                None
            }
        }
    }

    /// Evaluate a condition slot and coerce the result to a boolean
    pub fn evaluate_condition(
        &self,
        descriptor: &ValueDescriptor,
        kind: ExpressionKind,
        issues: &mut IssueCollection,
    ) -> Option<bool> {
        let value = self.evaluate(descriptor, kind, issues)?;
        match to_boolean(self.culture, &value) {
            Ok(condition) => Some(condition),
            Err(error) => {
                report(issues, descriptor, kind, error);
                None
            }
        }
    }

    fn stored(&self, reference: &str) -> Option<&Value> {
        self.values.get(&reference_key(reference)).map(|entry| &entry.value)
    }

    fn lookup(&self, name: &str, current: &ValueDescriptor) -> Option<Value> {
        let key = reference_key(name);
        if let Some(value) = self.constants.get(&key) {
            return Some(value.clone());
        }

        if key == THIS {
            return self.lookup(&current.reference, current);
        }

        if key == REQUIRED {
            return Some(Value::Boolean(self.stored(&current.reference).is_some()));
        }

        if let Some(reference) = key.strip_suffix(MISSING_TOLERANT_SUFFIX) {
            let reference = reference.trim_end();
            let constant = self.constants.get(reference).cloned();
            return Some(constant.or_else(|| self.stored(reference).cloned()).unwrap_or_default());
        }

        self.stored(&key).cloned()
    }
}

fn report(issues: &mut IssueCollection, descriptor: &ValueDescriptor, kind: ExpressionKind, error: impl Display) {
    issues.push(Issue::model_error(
        descriptor,
        format!("{} expression of '{}' failed: {}", kind, descriptor.display_name(), error),
    ));
}

/// Resolver view for the field currently being evaluated
struct FieldScope<'e, 'a> {
    evaluator: &'e ExpressionEvaluator<'a>,
    descriptor: &'e ValueDescriptor,
}

impl Resolver for FieldScope<'_, '_> {
    fn resolve(&self, name: &str) -> EvalResult<Option<Value>> {
        Ok(self.evaluator.lookup(name, self.descriptor))
    }

    fn to_number(&self, value: &Value) -> Option<f64> {
        let value_type = match self.descriptor.value_type {
            TypeOfValue::String => TypeOfValue::Double,
            other => other,
        };
        match to_number_as(value_type, self.evaluator.culture, value) {
            Ok(number) => number,
            Err(error) => {
                log::warn!("skipping value in '{}': {}", self.descriptor.display_name(), error);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::IssueSeverity;

    fn values(entries: &[(&str, Value)]) -> IndexMap<String, DataSetValue> {
        entries
            .iter()
            .map(|(reference, value)| (reference_key(reference), DataSetValue::new(*reference, value.clone())))
            .collect()
    }

    #[test]
    fn test_this_and_required() {
        let engine = Engine::new();
        let culture = Culture::invariant();
        let stored = values(&[("a", Value::from(5)), ("b", Value::from(3))]);
        let evaluator = ExpressionEvaluator::new(&engine, &stored, &culture);
        let field = ValueDescriptor::new("b").with_valid_if("required and this < a");

        let mut issues = IssueCollection::new();
        assert_eq!(evaluator.evaluate_condition(&field, ExpressionKind::ValidIf, &mut issues), Some(true));
        assert!(issues.is_empty());
    }

    #[test]
    fn test_missing_tolerant_reference() {
        let engine = Engine::new();
        let culture = Culture::invariant();
        let stored = values(&[]);
        let evaluator = ExpressionEvaluator::new(&engine, &stored, &culture);
        let field = ValueDescriptor::calculated("c", "isnull([missing?])");

        let mut issues = IssueCollection::new();
        let result = evaluator.evaluate(&field, ExpressionKind::Calculated, &mut issues);
        assert_eq!(result, Some(Value::Boolean(true)));
        assert!(issues.is_empty());
    }

    #[test]
    fn test_failure_becomes_model_error() {
        let engine = Engine::new();
        let culture = Culture::invariant();
        let stored = values(&[]);
        let evaluator = ExpressionEvaluator::new(&engine, &stored, &culture);
        let field = ValueDescriptor::calculated("b", "a * 2");

        let mut issues = IssueCollection::new();
        assert_eq!(evaluator.evaluate(&field, ExpressionKind::Calculated, &mut issues), None);
        assert_eq!(issues.len(), 1);
        let issue = &issues.as_slice()[0];
        assert_eq!(issue.severity, IssueSeverity::ModelError);
        assert_eq!(issue.reference.as_deref(), Some("b"));
        assert!(issue.message.starts_with("CalculatedValue expression of 'b' failed:"));
    }

    #[test]
    fn test_constants_shadow_values() {
        let engine = Engine::new();
        let culture = Culture::invariant();
        let stored = values(&[("a", Value::from(1))]);
        let evaluator = ExpressionEvaluator::new(&engine, &stored, &culture)
            .with_constant("value", Value::from(10))
            .with_constant("a", Value::from(10));
        let field = ValueDescriptor::new("a").with_transformation("value + this");

        let mut issues = IssueCollection::new();
        let result = evaluator.evaluate(&field, ExpressionKind::Transformation, &mut issues);
        assert_eq!(result, Some(Value::from(20)));
    }

    #[test]
    fn test_non_boolean_condition_is_model_error() {
        let engine = Engine::new();
        let culture = Culture::invariant();
        let stored = values(&[]);
        let evaluator = ExpressionEvaluator::new(&engine, &stored, &culture);
        let field = ValueDescriptor::new("a").with_valid_if("'maybe'");

        let mut issues = IssueCollection::new();
        assert_eq!(evaluator.evaluate_condition(&field, ExpressionKind::ValidIf, &mut issues), None);
        assert!(issues.has_errors());
    }
}
