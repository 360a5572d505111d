//! JSON protocol documents
//!
//! Properties use PascalCase names in declaration order. Empty strings,
//! default enum values and empty collections are omitted, so saving a
//! loaded document reproduces it byte for byte. Output is indented with two
//! spaces and has no trailing newline.

use crate::protocol::ProtocolDescriptor;
use blackboard_diagnostics::{BB0401, BB0406, BlackboardError, Result};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

fn invalid_format(error: serde_json::Error) -> BlackboardError {
    if error.is_io() {
        return BlackboardError::storage(BB0401, error.to_string());
    }
    BlackboardError::storage(BB0406, format!("Invalid protocol document: {}", error))
}

/// Parse a protocol document
pub fn load_from_str(text: &str) -> Result<ProtocolDescriptor> {
    serde_json::from_str(text).map_err(invalid_format)
}

/// Read a protocol document (UTF-8)
pub fn load(mut reader: impl Read) -> Result<ProtocolDescriptor> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    load_from_str(&text)
}

pub fn load_file(path: impl AsRef<Path>) -> Result<ProtocolDescriptor> {
    let path = path.as_ref();
    log::debug!("loading protocol from {}", path.display());
    let text = fs::read_to_string(path).map_err(|e| BlackboardError::from(e).with_context(path.display().to_string()))?;
    load_from_str(&text).map_err(|e| e.with_context(path.display().to_string()))
}

/// Serialize a protocol in canonical form
pub fn save_to_string(protocol: &ProtocolDescriptor) -> Result<String> {
    serde_json::to_string_pretty(protocol).map_err(invalid_format)
}

pub fn save(protocol: &ProtocolDescriptor, mut writer: impl Write) -> Result<()> {
    let text = save_to_string(protocol)?;
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    Ok(())
}

pub fn save_file(protocol: &ProtocolDescriptor, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    log::debug!("saving protocol to {}", path.display());
    let text = save_to_string(protocol)?;
    fs::write(path, text).map_err(|e| BlackboardError::from(e).with_context(path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{AggregationMode, TypeOfValue, ValueDescriptor};
    use crate::protocol::SectionDescriptor;
    use blackboard_diagnostics::BB0404;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_omitted() {
        let protocol = ProtocolDescriptor::new("p").with_section(
            SectionDescriptor::new("s").with_value(
                ValueDescriptor::new("a")
                    .with_type(TypeOfValue::Boolean)
                    .with_aggregation(AggregationMode::Count),
            ),
        );
        let expected = r#"{
  "Reference": "p",
  "Sections": [
    {
      "Name": "s",
      "Values": [
        {
          "Reference": "a",
          "Type": "Boolean",
          "PreferredAggregation": "Count"
        }
      ]
    }
  ]
}"#;
        assert_eq!(save_to_string(&protocol).unwrap(), expected);
    }

    #[test]
    fn test_missing_properties_load_as_defaults() {
        let protocol = load_from_str(r#"{"Reference": "p", "Sections": [{"Values": [{"Reference": "a"}]}]}"#).unwrap();
        let value = &protocol.sections[0].values[0];
        assert_eq!(value.value_type, TypeOfValue::Double);
        assert_eq!(value.preferred_aggregation, AggregationMode::None);
        assert!(value.children.is_empty());
    }

    #[test]
    fn test_invalid_document() {
        assert_eq!(load_from_str("{ not json").unwrap_err().code(), BB0406);
        assert_eq!(load_from_str(r#"{"Sections": 3}"#).unwrap_err().code(), BB0406);
    }

    #[test]
    fn test_missing_file() {
        let err = load_file("/definitely/not/here.json").unwrap_err();
        assert_eq!(err.code(), BB0404);
    }
}
