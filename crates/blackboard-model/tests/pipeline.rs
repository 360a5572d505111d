//! Data Set Pipeline Tests
//!
//! Tests for: default population, two-phase calculation, enabled-if,
//! validation and warning rules, issue accumulation

mod common;

use blackboard_model::{DataSet, Culture, IssueSeverity, ValueDescriptor};
use blackboard_expr::Value;
use common::{bmi_protocol, protocol};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

fn severities(dataset: &DataSet) -> Vec<IssueSeverity> {
    dataset.issues().iter().map(|issue| issue.severity).collect()
}

fn number(dataset: &DataSet, reference: &str) -> Option<f64> {
    dataset.value(reference).and_then(Value::as_number)
}

// ============================================================================
// Defaults and Calculated Fields
// ============================================================================

#[test]
fn test_defaults_feed_calculated_fields() {
    let mut dataset = DataSet::new(protocol(vec![
        ValueDescriptor::new("a").with_default("2"),
        ValueDescriptor::new("b").with_default("2 + 2"),
        ValueDescriptor::calculated("c", "a + b"),
    ]));
    assert!(dataset.is_dirty());

    dataset.calculate();

    assert_eq!(number(&dataset, "a"), Some(2.0));
    assert_eq!(number(&dataset, "b"), Some(4.0));
    assert_eq!(number(&dataset, "c"), Some(6.0));
    assert!(dataset.issues().is_empty());
    assert!(!dataset.is_dirty());
}

#[test]
fn test_missing_input_reports_one_issue() {
    let mut dataset = DataSet::new(protocol(vec![
        ValueDescriptor::new("a"),
        ValueDescriptor::calculated("b", "a * 2"),
    ]));

    dataset.calculate();

    assert_eq!(dataset.issues().len(), 1);
    assert_eq!(severities(&dataset), vec![IssueSeverity::ModelError]);
    assert_eq!(dataset.value("b"), None);
}

#[test]
fn test_defaults_can_be_suppressed() {
    let dataset = DataSet::builder(protocol(vec![ValueDescriptor::new("a").with_default("1")]))
        .populate_defaults(false)
        .build();
    assert!(dataset.is_empty());
    assert!(!dataset.is_dirty());
}

#[test]
fn test_failed_default_is_left_unset() {
    let dataset = DataSet::new(protocol(vec![ValueDescriptor::new("a").with_default("missing + 1")]));
    assert_eq!(dataset.value("a"), None);
    assert_eq!(severities(&dataset), vec![IssueSeverity::ModelError]);
}

#[test]
fn test_calculated_fields_see_earlier_results() {
    let mut dataset = DataSet::new(protocol(vec![
        ValueDescriptor::new("a"),
        ValueDescriptor::calculated("b", "a + 1"),
        ValueDescriptor::calculated("c", "b * 10"),
    ]));
    dataset.add_value("a", 1).unwrap();
    dataset.calculate();
    assert_eq!(number(&dataset, "c"), Some(20.0));
}

#[test]
fn test_bmi_protocol() {
    let mut dataset = DataSet::new(Arc::new(bmi_protocol()));
    dataset.add_value("weight", 120).unwrap();
    dataset.add_value("height", 180).unwrap();
    dataset.calculate();

    assert_eq!(number(&dataset, "bmi"), Some(37.0));
    assert_eq!(severities(&dataset), vec![IssueSeverity::Warning]);
    assert_eq!(dataset.issues().as_slice()[0].message, "Obese.");
}

// ============================================================================
// Enabled-If
// ============================================================================

#[rstest]
#[case(1, Some(10.0))]
#[case(0, None)]
fn test_enabled_if(#[case] flag: i32, #[case] expected: Option<f64>) {
    let mut dataset = DataSet::new(protocol(vec![
        ValueDescriptor::new("flag"),
        ValueDescriptor::calculated("c", "10").with_enabled_if("flag == 1"),
    ]));
    dataset.add_value("flag", flag).unwrap();
    dataset.calculate();

    assert_eq!(number(&dataset, "c"), expected);
    assert!(dataset.issues().is_empty());
}

#[test]
fn test_disabled_field_rules_are_skipped() {
    let mut dataset = DataSet::new(protocol(vec![
        ValueDescriptor::calculated("c", "10")
            .with_enabled_if("false")
            .with_valid_if("this > 100"),
    ]));
    dataset.calculate();
    assert!(dataset.issues().is_empty());
}

// ============================================================================
// Validation
// ============================================================================

#[rstest]
#[case(6, 1)]
#[case(0, 0)]
fn test_valid_if_against_other_field(#[case] b: i32, #[case] expected_issues: usize) {
    let mut dataset = DataSet::new(protocol(vec![
        ValueDescriptor::new("a"),
        ValueDescriptor::new("b").with_valid_if("this < a"),
    ]));
    dataset.add_value("a", 5).unwrap();
    dataset.add_value("b", b).unwrap();
    dataset.calculate();

    assert_eq!(dataset.issues().len(), expected_issues);
    assert!(dataset.issues().iter().all(|issue| issue.severity == IssueSeverity::ValidationError));
}

#[test]
fn test_this_and_other_reference() {
    let mut dataset = DataSet::new(protocol(vec![
        ValueDescriptor::new("a"),
        ValueDescriptor::new("b").with_valid_if("this == 1 and this == a"),
    ]));
    dataset.add_value("a", 1).unwrap();
    dataset.add_value("b", 1).unwrap();
    dataset.calculate();
    assert!(dataset.issues().is_empty());
}

#[test]
fn test_invalid_base_data_skips_calculation() {
    let mut dataset = DataSet::new(protocol(vec![
        ValueDescriptor::new("a").with_valid_if("this > 0"),
        ValueDescriptor::calculated("b", "a * 2").with_valid_if("this > 0"),
    ]));
    dataset.add_value("a", -1).unwrap();
    dataset.calculate();

    assert_eq!(severities(&dataset), vec![IssueSeverity::ValidationError]);
    assert_eq!(dataset.value("b"), None);
    assert!(dataset.is_dirty());
}

#[test]
fn test_warnings_do_not_stop_calculation() {
    let mut dataset = DataSet::new(protocol(vec![
        ValueDescriptor::new("a").with_warning_if("this > 10"),
        ValueDescriptor::new("b").with_warning_if("this > 10"),
        ValueDescriptor::calculated("c", "a + b"),
    ]));
    dataset.add_value("a", 11).unwrap();
    dataset.add_value("b", 12).unwrap();
    dataset.calculate();

    assert_eq!(severities(&dataset), vec![IssueSeverity::Warning, IssueSeverity::Warning]);
    assert_eq!(number(&dataset, "c"), Some(23.0));
}

#[test]
fn test_warnings_come_before_validation_errors() {
    let mut dataset = DataSet::new(protocol(vec![
        ValueDescriptor::new("a").with_valid_if("this < 0"),
        ValueDescriptor::new("b").with_warning_if("true"),
    ]));
    dataset.add_value("a", 1).unwrap();
    dataset.add_value("b", 1).unwrap();
    dataset.calculate();

    assert_eq!(
        severities(&dataset),
        vec![IssueSeverity::Warning, IssueSeverity::ValidationError]
    );
}

#[test]
fn test_missing_tolerant_reference_has_no_issues() {
    let mut dataset = DataSet::new(protocol(vec![
        ValueDescriptor::new("invalid"),
        ValueDescriptor::calculated("c", "isnull([invalid?])"),
    ]));
    dataset.calculate();
    assert_eq!(dataset.value("c"), Some(&Value::Boolean(true)));
    assert!(dataset.issues().is_empty());
}

#[test]
fn test_required_keyword() {
    let mut dataset = DataSet::new(protocol(vec![
        ValueDescriptor::new("a").with_valid_if("required").with_validation_message("a is required"),
    ]));
    dataset.calculate();
    assert_eq!(dataset.issues().as_slice()[0].message, "a is required");
}

#[test]
fn test_issues_accumulate_until_cleared() {
    let mut dataset = DataSet::new(protocol(vec![ValueDescriptor::new("a").with_valid_if("this > 0")]));
    dataset.add_value("a", 0).unwrap();
    dataset.calculate();
    dataset.calculate();
    assert_eq!(dataset.issues().len(), 2);

    dataset.clear_issues();
    dataset.add_value("a", 1).unwrap();
    dataset.calculate();
    assert!(dataset.issues().is_empty());
}

// ============================================================================
// Culture
// ============================================================================

#[test]
fn test_culture_boolean_literals_in_conditions() {
    let mut dataset = DataSet::builder(protocol(vec![
        ValueDescriptor::new("ok").with_valid_if("ok"),
    ]))
    .culture(Culture::from_name("it-IT").unwrap())
    .build();
    dataset.add_value("ok", "vero").unwrap();
    dataset.calculate();
    assert!(dataset.issues().is_empty());
}

#[test]
fn test_changing_culture_marks_dirty() {
    let mut dataset = DataSet::new(protocol(vec![ValueDescriptor::new("a")]));
    dataset.calculate();
    assert!(!dataset.is_dirty());

    dataset.set_culture(Culture::from_name("de-DE").unwrap());
    assert!(dataset.is_dirty());
    assert_eq!(dataset.culture().name, "de-DE");
}

#[test]
fn test_values_in_protocol_order() {
    let mut dataset = DataSet::new(protocol(vec![ValueDescriptor::new("x"), ValueDescriptor::new("y")]));
    dataset.add_value("Y", 2).unwrap();
    dataset.add_value("x", 1).unwrap();
    let references: Vec<&str> = dataset.values().into_iter().map(|entry| entry.reference.as_str()).collect();
    assert_eq!(references, vec!["x", "y"]);
}

#[test]
fn test_fields_without_reference_are_not_stored() {
    let mut dataset = DataSet::new(protocol(vec![
        ValueDescriptor::calculated("", "1"),
        ValueDescriptor::calculated("", "2"),
        ValueDescriptor::calculated("c", "3"),
    ]));

    dataset.calculate();

    assert!(dataset.issues().is_empty());
    assert_eq!(dataset.len(), 1);
    let stored: Vec<(&str, &Value)> = dataset
        .values()
        .into_iter()
        .map(|entry| (entry.reference.as_str(), &entry.value))
        .collect();
    assert_eq!(stored, vec![("c", &Value::from(3))]);
}

#[test]
fn test_default_rule_message_names_reference() {
    let mut dataset = DataSet::new(protocol(vec![
        ValueDescriptor::new("weight").with_name("Body weight").with_valid_if("this > 0"),
    ]));
    dataset.add_value("weight", -1).unwrap();

    dataset.calculate();

    let messages: Vec<&str> = dataset.issues().iter().map(|issue| issue.message.as_str()).collect();
    assert_eq!(messages, vec!["Value '-1' for 'weight' is not valid."]);
}

#[rstest]
#[case(300)]
#[case(20_000)]
fn test_deeply_nested_expression_is_a_model_error(#[case] depth: usize) {
    let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let mut dataset = DataSet::new(protocol(vec![ValueDescriptor::calculated("c", source)]));

    dataset.calculate();

    assert_eq!(severities(&dataset), vec![IssueSeverity::ModelError]);
    assert_eq!(dataset.value("c"), None);
}
