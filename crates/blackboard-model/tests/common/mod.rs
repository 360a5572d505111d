//! Shared protocol fixtures for integration tests

#![allow(dead_code)]

use blackboard_model::{ProtocolDescriptor, SectionDescriptor, ValueDescriptor};
use std::sync::Arc;

/// Protocol with a single section holding the given fields
pub fn protocol(values: Vec<ValueDescriptor>) -> Arc<ProtocolDescriptor> {
    Arc::new(protocol_named("test", values))
}

pub fn protocol_named(reference: &str, values: Vec<ValueDescriptor>) -> ProtocolDescriptor {
    let section = values
        .into_iter()
        .fold(SectionDescriptor::new("main"), SectionDescriptor::with_value);
    ProtocolDescriptor::new(reference).with_section(section)
}

/// Weight, height and the calculated body mass index
pub fn bmi_protocol() -> ProtocolDescriptor {
    ProtocolDescriptor::new("bmi")
        .with_name("Body mass index")
        .with_section(
            SectionDescriptor::new("Measures")
                .with_value(
                    ValueDescriptor::new("weight")
                        .with_name("Weight (kg)")
                        .with_valid_if("this > 0")
                        .with_validation_message("Weight must be positive."),
                )
                .with_value(ValueDescriptor::new("height").with_name("Height (cm)").with_valid_if("this > 0")),
        )
        .with_section(
            SectionDescriptor::new("Results").with_value(
                ValueDescriptor::calculated("bmi", "round(weight / pow(height / 100, 2), 1)")
                    .with_warning_if("this >= 30")
                    .with_warning_message("Obese."),
            ),
        )
}
