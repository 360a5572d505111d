//! OpenBlackboard for Rust
//!
//! Protocols describe the fields of a clinical data collection form along
//! with expressions for defaults, calculated values and validation rules.
//! This crate bundles:
//! - the expression language ([`expr`])
//! - the protocol model, data set pipeline and aggregation ([`model`])
//! - error codes and diagnostics ([`diagnostics`])
//!
//! # Example
//!
//! ```
//! use blackboard::{DataSet, ProtocolDescriptor, SectionDescriptor, ValueDescriptor};
//! use std::sync::Arc;
//!
//! let protocol = ProtocolDescriptor::new("bmi").with_section(
//!     SectionDescriptor::new("patient")
//!         .with_value(ValueDescriptor::new("weight").with_valid_if("this > 0"))
//!         .with_value(ValueDescriptor::new("height").with_valid_if("this > 0"))
//!         .with_value(ValueDescriptor::calculated("bmi", "round(weight / pow(height / 100, 2), 1)")),
//! );
//!
//! let mut dataset = DataSet::new(Arc::new(protocol));
//! dataset.add_value("weight", 72).unwrap();
//! dataset.add_value("height", 180).unwrap();
//! dataset.calculate();
//!
//! assert_eq!(dataset.value("bmi").and_then(|v| v.as_number()), Some(22.2));
//! ```

pub use blackboard_diagnostics as diagnostics;
pub use blackboard_expr as expr;
pub use blackboard_model as model;

// Convenience re-exports
pub use blackboard_diagnostics::{BlackboardError, ErrorCode, Result};
pub use blackboard_expr::{Engine, Value};
pub use blackboard_model::storage::{self, InMemoryRepository, Repository};
pub use blackboard_model::{
    AggregationMode, AggregationOptions, Culture, DataSet, DataSetAggregator, DataSetBuilder, Issue,
    IssueCollection, IssueSeverity, ProtocolDescriptor, SectionDescriptor, TypeOfValue, ValueDescriptor,
};

#[cfg(feature = "cli")]
pub mod cli;
