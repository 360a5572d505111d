//! Repository Tests
//!
//! Tests for: centers, protocol registration, submissions, restore

mod common;

use blackboard_diagnostics::{BB0322, BB0330, BB0331, BB0332, BlackboardError};
use blackboard_expr::Value;
use blackboard_model::storage::{InMemoryRepository, Repository};
use blackboard_model::{DataSet, ProtocolDescriptor};
use common::bmi_protocol;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn submitted_dataset(protocol: &Arc<ProtocolDescriptor>) -> DataSet {
    let mut dataset = DataSet::new(Arc::clone(protocol));
    dataset.add_value("weight", 80).unwrap();
    dataset.add_value("height", 200).unwrap();
    dataset.calculate();
    dataset
}

#[test]
fn test_submit_and_restore() {
    let protocol = Arc::new(bmi_protocol());
    let mut repository = InMemoryRepository::new();
    let center = repository.add_center("Clinic", "admin");

    let submission = repository
        .submit(center.id, &submitted_dataset(&protocol), "nurse")
        .unwrap();
    assert_eq!(submission.center_id, center.id);
    assert_eq!(submission.created_by, "nurse");
    // Calculated fields are not persisted
    let references: Vec<&str> = submission.values.iter().map(|v| v.reference.as_str()).collect();
    assert_eq!(references, vec!["weight", "height"]);

    let mut restored = repository.restore(submission.id, Arc::clone(&protocol)).unwrap();
    restored.calculate();
    assert_eq!(restored.value("bmi"), Some(&Value::from(20)));
}

#[test]
fn test_protocol_registered_on_first_submission() {
    let protocol = Arc::new(bmi_protocol());
    let mut repository = InMemoryRepository::new();
    let center = repository.add_center("Clinic", "admin");
    assert!(repository.find_protocol("bmi").is_none());

    repository.submit(center.id, &submitted_dataset(&protocol), "a").unwrap();
    repository.submit(center.id, &submitted_dataset(&protocol), "b").unwrap();

    assert!(repository.find_protocol("BMI").is_some());
    assert_eq!(repository.submissions_for("bmi").len(), 2);
    assert!(repository.submissions_for("other").is_empty());
}

#[test]
fn test_submit_errors() {
    let protocol = Arc::new(bmi_protocol());
    let mut repository = InMemoryRepository::new();
    let dataset = submitted_dataset(&protocol);
    assert_eq!(repository.submit(42, &dataset, "x").unwrap_err().code(), BB0330);

    let center = repository.add_center("Clinic", "admin");
    let mut invalid = DataSet::new(Arc::clone(&protocol));
    invalid.add_value("weight", -1).unwrap();
    invalid.add_value("height", 200).unwrap();
    invalid.calculate();
    assert_eq!(repository.submit(center.id, &invalid, "x").unwrap_err().code(), BB0322);
}

#[test]
fn test_restore_errors() {
    let protocol = Arc::new(bmi_protocol());
    let mut repository = InMemoryRepository::new();
    let center = repository.add_center("Clinic", "admin");
    let submission = repository.submit(center.id, &submitted_dataset(&protocol), "x").unwrap();

    assert_eq!(repository.restore(99, Arc::clone(&protocol)).unwrap_err().code(), BB0331);

    let other = Arc::new(ProtocolDescriptor::new("other"));
    let err = repository.restore(submission.id, other).unwrap_err();
    assert_eq!(err.code(), BB0332);
    assert!(matches!(err, BlackboardError::Argument { .. }));
}
