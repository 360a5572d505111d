//! Protocols and sections

use crate::descriptor::{ValueDescriptor, reference_key};
use crate::issue::{Issue, IssueSeverity};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Named grouping of fields
///
/// Sections are organizational only: every field of every section is
/// visible to every expression.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SectionDescriptor {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub short_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ValueDescriptor>,
}

impl SectionDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: ValueDescriptor) -> Self {
        self.values.push(value);
        self
    }
}

/// A protocol: the schema submissions are calculated against
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProtocolDescriptor {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reference: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub short_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<SectionDescriptor>,
}

impl ProtocolDescriptor {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_section(mut self, section: SectionDescriptor) -> Self {
        self.sections.push(section);
        self
    }

    /// Every field of every section, parents before children
    pub fn all_values(&self) -> Vec<&ValueDescriptor> {
        let mut out = Vec::new();
        for section in &self.sections {
            for value in &section.values {
                value.collect_into(&mut out);
            }
        }
        out
    }

    /// Find a field by reference (case-insensitive)
    pub fn find(&self, reference: &str) -> Option<&ValueDescriptor> {
        let key = reference_key(reference);
        if key.is_empty() {
            return None;
        }
        self.all_values()
            .into_iter()
            .find(|value| reference_key(&value.reference) == key)
    }

    /// Check the whole schema
    ///
    /// Duplicate references come first, one issue per duplicate group, then
    /// the field-level issues in traversal order.
    pub fn validate_model(&self) -> Vec<Issue> {
        let values = self.all_values();

        let mut groups: IndexMap<String, Vec<&ValueDescriptor>> = IndexMap::new();
        for value in &values {
            let key = reference_key(&value.reference);
            if key.is_empty() {
                continue;
            }
            groups.entry(key).or_default().push(*value);
        }

        let mut issues: Vec<Issue> = groups
            .values()
            .filter(|group| group.len() > 1)
            .map(|group| {
                let first = group[0];
                Issue::for_field(
                    IssueSeverity::ModelError,
                    first,
                    format!("Value '{}': multiple values with same reference ID.", first.reference),
                )
            })
            .collect();

        for section in &self.sections {
            for descriptor in &section.values {
                issues.extend(descriptor.validate_model());
            }
        }

        issues
    }
}
