//! Aggregation of many data sets into one
//!
//! [`DataSetAggregator::accumulate`] folds the stored values of data sets of
//! one protocol into an accumulator. [`DataSetAggregator::calculate`] then
//! builds a new data set where every field holds the aggregate of its
//! accumulated values, and runs it through the regular calculation pipeline.

use crate::accumulator::DataSetValueAccumulator;
use crate::conversion::{Culture, to_number_as};
use crate::dataset::DataSet;
use crate::descriptor::{AggregationMode, ExpressionKind, TypeOfValue, ValueDescriptor};
use crate::protocol::ProtocolDescriptor;
use blackboard_diagnostics::{BB0320, BB0321, BB0322, BlackboardError, Result};
use blackboard_expr::{Engine, Value};
use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

/// Name bound to each accumulated element while a transformation runs
pub const TRANSFORMED_VALUE: &str = "value";

/// Name bound to the element sequence of a custom aggregation expression
pub const AGGREGATED_VALUES: &str = "values";

/// Aggregation behavior flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AggregationOptions(u8);

impl AggregationOptions {
    pub const NONE: Self = Self(0);
    /// Count mode ignores null values
    pub const EXCLUDE_NULL_VALUES_FROM_COUNT: Self = Self(1);
    /// Keep aggregating after the result collects errors
    pub const IGNORE_AGGREGATION_ERRORS: Self = Self(1 << 1);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for AggregationOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AggregationOptions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Combines data sets of one protocol into an aggregate data set
pub struct DataSetAggregator {
    protocol: Arc<ProtocolDescriptor>,
    engine: Arc<Engine>,
    options: AggregationOptions,
    culture: Option<Culture>,
    accumulator: DataSetValueAccumulator,
}

impl DataSetAggregator {
    pub fn new(protocol: Arc<ProtocolDescriptor>) -> Self {
        Self {
            protocol,
            engine: Arc::new(Engine::new()),
            options: AggregationOptions::NONE,
            culture: None,
            accumulator: DataSetValueAccumulator::new(),
        }
    }

    pub fn with_options(mut self, options: AggregationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_engine(mut self, engine: Arc<Engine>) -> Self {
        self.engine = engine;
        self
    }

    pub fn options(&self) -> AggregationOptions {
        self.options
    }

    /// Culture locked in by the first accumulated data set
    pub fn culture(&self) -> Option<&Culture> {
        self.culture.as_ref()
    }

    /// Fold data sets into the accumulator
    ///
    /// Dirty data sets are recalculated first. Either every data set is
    /// accepted or none is.
    pub fn accumulate<'d>(&mut self, datasets: impl IntoIterator<Item = &'d mut DataSet>) -> Result<()> {
        let mut accepted = Vec::new();
        let mut culture = self.culture.clone();

        for dataset in datasets {
            if !dataset
                .protocol()
                .reference
                .trim()
                .eq_ignore_ascii_case(self.protocol.reference.trim())
            {
                return Err(BlackboardError::aggregation(
                    BB0320,
                    format!(
                        "Data set of protocol '{}' cannot be aggregated with protocol '{}'.",
                        dataset.protocol().reference,
                        self.protocol.reference
                    ),
                ));
            }

            if let Some(locked) = &culture {
                if locked != dataset.culture() {
                    return Err(BlackboardError::aggregation(
                        BB0321,
                        format!(
                            "Data set culture '{}' does not match the aggregation culture '{}'.",
                            dataset.culture(),
                            locked
                        ),
                    ));
                }
            } else {
                culture = Some(dataset.culture().clone());
            }

            if dataset.is_dirty() {
                dataset.calculate();
            }
            if !dataset.is_usable() || dataset.issues().has_errors() {
                return Err(BlackboardError::aggregation(
                    BB0322,
                    format!(
                        "Data set of protocol '{}' contains {} error(s).",
                        dataset.protocol().reference,
                        dataset.issues().errors().count()
                    ),
                ));
            }
            accepted.push(dataset);
        }

        log::debug!("accumulating {} data set(s)", accepted.len());
        for dataset in accepted {
            self.accumulator.add_all(dataset);
        }
        self.culture = culture;
        Ok(())
    }

    /// Forget accumulated values and the locked culture
    pub fn clear(&mut self) {
        self.accumulator.clear();
        self.culture = None;
    }

    /// Build the aggregate data set
    pub fn calculate(&self) -> DataSet {
        let mut result = DataSet::builder(Arc::clone(&self.protocol))
            .culture(self.culture.clone().unwrap_or_default())
            .engine(Arc::clone(&self.engine))
            .populate_defaults(false)
            .build();
        if !result.is_usable() {
            return result;
        }

        let protocol = Arc::clone(&self.protocol);
        for descriptor in protocol.all_values() {
            if descriptor.reference.trim().is_empty() {
                continue;
            }

            let values = self.transform(&mut result, descriptor);
            if self.stops_on_errors(&result) {
                log::warn!("aggregation stopped at '{}' after transformation errors", descriptor.reference);
                return result;
            }

            if let Some(value) = self.aggregate(&mut result, descriptor, values) {
                result.store(descriptor, value);
            }
            if self.stops_on_errors(&result) {
                log::warn!("aggregation stopped at '{}' after errors", descriptor.reference);
                return result;
            }
        }

        result.calculate();
        result
    }

    fn stops_on_errors(&self, result: &DataSet) -> bool {
        !self.options.contains(AggregationOptions::IGNORE_AGGREGATION_ERRORS) && result.issues().has_errors()
    }

    /// Accumulated values of a field, through its transformation if it has one
    fn transform(&self, result: &mut DataSet, descriptor: &ValueDescriptor) -> Vec<Value> {
        let raw = self.accumulator.values(&descriptor.reference);
        if !descriptor.has_expression(ExpressionKind::Transformation) {
            return raw.to_vec();
        }

        raw.iter()
            .map(|value| {
                let constants = [
                    (TRANSFORMED_VALUE, value.clone()),
                    (descriptor.reference.as_str(), value.clone()),
                ];
                result
                    .evaluate_with(descriptor, ExpressionKind::Transformation, &constants)
                    .unwrap_or_default()
            })
            .collect()
    }

    fn aggregate(&self, result: &mut DataSet, descriptor: &ValueDescriptor, mut values: Vec<Value>) -> Option<Value> {
        if descriptor.preferred_aggregation == AggregationMode::Count
            && self.options.contains(AggregationOptions::EXCLUDE_NULL_VALUES_FROM_COUNT)
        {
            values.retain(|value| !value.is_null());
        }

        if descriptor.has_expression(ExpressionKind::Aggregation) {
            let constants = [(AGGREGATED_VALUES, Value::Sequence(values))];
            return result.evaluate_with(descriptor, ExpressionKind::Aggregation, &constants);
        }

        // Transformed values are numeric whatever the declared type
        let value_type = match descriptor.value_type {
            TypeOfValue::String if descriptor.has_expression(ExpressionKind::Transformation) => TypeOfValue::Double,
            other => other,
        };

        let aggregated = match descriptor.preferred_aggregation {
            AggregationMode::None => Value::Null,
            AggregationMode::Count => Value::Number(values.len() as f64),
            AggregationMode::Sum => Value::Number(total(&self.numbers(result, descriptor, value_type, &values))),
            AggregationMode::Average => {
                let numbers = self.numbers(result, descriptor, value_type, &values);
                if numbers.is_empty() {
                    Value::Null
                } else {
                    Value::Number(total(&numbers) / numbers.len() as f64)
                }
            }
        };
        Some(aggregated)
    }

    fn numbers(&self, result: &DataSet, descriptor: &ValueDescriptor, value_type: TypeOfValue, values: &[Value]) -> Vec<f64> {
        values
            .iter()
            .filter_map(|value| match to_number_as(value_type, result.culture(), value) {
                Ok(number) => number,
                Err(error) => {
                    log::warn!("skipping value of '{}': {}", descriptor.reference, error);
                    None
                }
            })
            .collect()
    }
}

/// Sum that is `0`, not `-0`, for no numbers
fn total(numbers: &[f64]) -> f64 {
    numbers.iter().fold(0.0, |sum, n| sum + n)
}
