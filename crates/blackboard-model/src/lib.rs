//! OpenBlackboard protocol model and calculation pipeline
//!
//! A protocol is a tree of sections and fields ([`ValueDescriptor`]) whose
//! defaults, calculated values and rules are written in the expression
//! language of `blackboard-expr`. This crate provides:
//!
//! - the schema model and its self-validation
//! - [`DataSet`]: one submission, validated then calculated in two passes
//! - [`DataSetAggregator`]: combines submissions into aggregate statistics
//! - culture-aware [`conversion`] of loosely-typed values
//! - JSON schema [`storage`] and the persistence contract
//!
//! # Example
//!
//! ```
//! use blackboard_model::{DataSet, ProtocolDescriptor, SectionDescriptor, ValueDescriptor};
//! use std::sync::Arc;
//!
//! let protocol = ProtocolDescriptor::new("bmi").with_section(
//!     SectionDescriptor::new("patient")
//!         .with_value(ValueDescriptor::new("weight"))
//!         .with_value(ValueDescriptor::new("height"))
//!         .with_value(ValueDescriptor::calculated("bmi", "weight / pow(height / 100, 2)")),
//! );
//!
//! let mut dataset = DataSet::new(Arc::new(protocol));
//! dataset.add_value("weight", 80).unwrap();
//! dataset.add_value("height", 200).unwrap();
//! dataset.calculate();
//!
//! assert_eq!(dataset.value("bmi").and_then(|v| v.as_number()), Some(20.0));
//! assert!(dataset.issues().is_empty());
//! ```

pub mod accumulator;
pub mod aggregator;
pub mod conversion;
pub mod dataset;
pub mod descriptor;
pub mod evaluator;
pub mod issue;
pub mod protocol;
pub mod storage;

pub use accumulator::DataSetValueAccumulator;
pub use aggregator::{AggregationOptions, DataSetAggregator};
pub use conversion::{Culture, to_boolean, to_number};
pub use dataset::{DataSet, DataSetBuilder, DataSetValue};
pub use descriptor::{AggregationMode, ExpressionKind, ListItem, TypeOfValue, ValueDescriptor};
pub use evaluator::ExpressionEvaluator;
pub use issue::{Issue, IssueCollection, IssueSeverity};
pub use protocol::{ProtocolDescriptor, SectionDescriptor};
