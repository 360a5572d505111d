//! Protocol Model Validation Tests
//!
//! Tests for: duplicate references, field-level rules, issue ordering,
//! unusable data sets

mod common;

use blackboard_diagnostics::BB0200;
use blackboard_model::{
    AggregationMode, DataSet, IssueSeverity, ListItem, ProtocolDescriptor, SectionDescriptor, ValueDescriptor,
};
use common::{bmi_protocol, protocol_named};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;

#[test]
fn test_valid_protocol_has_no_issues() {
    assert!(bmi_protocol().validate_model().is_empty());
}

#[test]
fn test_nested_duplicates_are_found() {
    let protocol = ProtocolDescriptor::new("p")
        .with_section(SectionDescriptor::new("a").with_value(ValueDescriptor::new("x")))
        .with_section(
            SectionDescriptor::new("b")
                .with_value(ValueDescriptor::new("parent").with_child(ValueDescriptor::new("X"))),
        );
    let issues = protocol.validate_model();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, IssueSeverity::ModelError);
    assert_eq!(issues[0].message, "Value 'x': multiple values with same reference ID.");
}

#[test]
fn test_blank_references_are_not_duplicates() {
    let protocol = protocol_named(
        "p",
        vec![ValueDescriptor::calculated("", "1"), ValueDescriptor::calculated("", "2")],
    );
    assert!(protocol.validate_model().is_empty());
}

#[test]
fn test_duplicates_reported_before_field_issues() {
    let protocol = protocol_named(
        "p",
        vec![
            ValueDescriptor::calculated("c", "1").with_available_values([ListItem::new("one", "1")]),
            ValueDescriptor::new("d"),
            ValueDescriptor::new("D"),
        ],
    );
    let messages: Vec<String> = protocol.validate_model().into_iter().map(|issue| issue.message).collect();
    assert_eq!(
        messages,
        vec![
            "Value 'd': multiple values with same reference ID.".to_string(),
            "Value 'c': AvailableValues cannot be used for calculated fields.".to_string(),
        ]
    );
}

#[test]
fn test_calculated_with_default_reports_one_error() {
    let protocol = protocol_named("p", vec![ValueDescriptor::calculated("b", "1").with_default("2")]);
    let issues = protocol.validate_model();
    assert_eq!(issues.len(), 1);
    assert!(issues[0].is_error());
}

#[test]
fn test_custom_aggregation_overrides_mode_warning() {
    let protocol = protocol_named(
        "p",
        vec![
            ValueDescriptor::new("a")
                .with_aggregation(AggregationMode::Sum)
                .with_aggregation_expression("count(values)"),
        ],
    );
    let issues = protocol.validate_model();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, IssueSeverity::Warning);
}

#[test]
fn test_invalid_protocol_makes_unusable_dataset() {
    let protocol = protocol_named("p", vec![ValueDescriptor::new("")]);
    let mut dataset = DataSet::new(Arc::new(protocol));

    assert!(!dataset.is_usable());
    assert!(dataset.is_empty());
    assert_eq!(dataset.issues().len(), 1);
    assert_eq!(dataset.add_value("a", 1).unwrap_err().code(), BB0200);
}

proptest! {
    #[test]
    fn prop_duplicate_references_are_reported(
        reference in "[a-z][a-z0-9_]{0,8}",
        upper in any::<bool>(),
        nested in any::<bool>(),
    ) {
        let twin = if upper { reference.to_uppercase() } else { reference.clone() };
        let first = ValueDescriptor::new(reference.clone());
        let values = if nested {
            vec![first.with_child(ValueDescriptor::new(twin))]
        } else {
            vec![first, ValueDescriptor::new(twin)]
        };
        let protocol = protocol_named("p", values);
        prop_assert!(!protocol.validate_model().is_empty());
    }
}
