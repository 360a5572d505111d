//! Protocol Storage Tests
//!
//! Tests for: JSON round trips, file and reader based load/save

mod common;

use blackboard_model::storage::json;
use blackboard_model::{
    AggregationMode, ListItem, ProtocolDescriptor, SectionDescriptor, TypeOfValue, ValueDescriptor,
};
use common::bmi_protocol;
use pretty_assertions::assert_eq;
use std::io::Cursor;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

fn full_protocol() -> ProtocolDescriptor {
    let mut protocol = bmi_protocol();
    protocol.short_name = "BMI".to_string();
    protocol.description = "Índice de masa corporal, 体重指数".to_string();
    protocol.sections.push(
        SectionDescriptor::new("Lifestyle").with_value(
            ValueDescriptor::new("smoker")
                .with_type(TypeOfValue::String)
                .with_available_values([ListItem::new("Yes", "y"), ListItem::new("No", "n")])
                .with_aggregation(AggregationMode::Average)
                .with_transformation("value == 'y' ? 1 : 0")
                .with_child(
                    ValueDescriptor::new("cigarettes")
                        .with_enabled_if("smoker == 'y'")
                        .with_visible_if("smoker == 'y'")
                        .with_aggregation_expression("sum(values)"),
                ),
        ),
    );
    protocol
}

// ============================================================================
// Round Trips
// ============================================================================

#[test]
fn test_string_round_trip() {
    let protocol = full_protocol();
    let saved = json::save_to_string(&protocol).unwrap();
    let loaded = json::load_from_str(&saved).unwrap();

    assert_eq!(loaded, protocol);
    assert_eq!(json::save_to_string(&loaded).unwrap(), saved);
    assert!(!saved.ends_with('\n'));
}

#[test]
fn test_file_round_trip_preserves_utf8() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("protocol.json");
    let protocol = full_protocol();

    json::save_file(&protocol, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("体重指数"));

    let loaded = json::load_file(&path).unwrap();
    assert_eq!(loaded, protocol);
}

#[test]
fn test_reader_and_writer() {
    let protocol = full_protocol();
    let mut buffer = Vec::new();
    json::save(&protocol, &mut buffer).unwrap();

    let loaded = json::load(Cursor::new(buffer)).unwrap();
    assert_eq!(loaded, protocol);
}

#[test]
fn test_property_order() {
    let saved = json::save_to_string(&full_protocol()).unwrap();
    let position = |name: &str| saved.find(&format!("\"{}\"", name)).unwrap();

    assert!(position("Reference") < position("Name"));
    assert!(position("Name") < position("ShortName"));
    assert!(position("Type") < position("AvailableValues"));
    assert!(position("TransformationForAggregation") < position("Children"));
    assert!(position("EnabledIf") < position("VisibleIf"));
    assert!(position("VisibleIf") < position("AggregationExpression"));
}

#[test]
fn test_invalid_utf8_is_io_error() {
    let err = json::load(Cursor::new(vec![0xff, 0xfe, 0x00])).unwrap_err();
    assert_eq!(err.code(), blackboard_diagnostics::BB0401);
}
