//! Field descriptors
//!
//! A [`ValueDescriptor`] is one entry of a protocol: its declared type, the
//! expressions that compute or check it, and how it is aggregated across
//! submissions. Descriptors nest through `children`.

use crate::issue::Issue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeOfValue {
    String,
    #[default]
    Double,
    Boolean,
}

impl TypeOfValue {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for TypeOfValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "String"),
            Self::Double => write!(f, "Double"),
            Self::Boolean => write!(f, "Boolean"),
        }
    }
}

/// How a field is combined across submissions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationMode {
    #[default]
    None,
    Sum,
    Average,
    Count,
}

impl AggregationMode {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Sum => write!(f, "Sum"),
            Self::Average => write!(f, "Average"),
            Self::Count => write!(f, "Count"),
        }
    }
}

/// One permitted literal value of a field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ListItem {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
}

impl ListItem {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The expression slots of a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionKind {
    Default,
    Calculated,
    ValidIf,
    WarningIf,
    EnabledIf,
    VisibleIf,
    Transformation,
    Aggregation,
}

impl ExpressionKind {
    /// Name of the slot as it appears in a protocol document
    pub const fn label(self) -> &'static str {
        match self {
            Self::Default => "DefaultValue",
            Self::Calculated => "CalculatedValue",
            Self::ValidIf => "ValidIf",
            Self::WarningIf => "WarningIf",
            Self::EnabledIf => "EnabledIf",
            Self::VisibleIf => "VisibleIf",
            Self::Transformation => "TransformationForAggregation",
            Self::Aggregation => "AggregationExpression",
        }
    }

    /// Expression text of this slot on a descriptor
    pub fn text(self, descriptor: &ValueDescriptor) -> &str {
        match self {
            Self::Default => &descriptor.default_value,
            Self::Calculated => &descriptor.calculated_value,
            Self::ValidIf => &descriptor.valid_if,
            Self::WarningIf => &descriptor.warning_if,
            Self::EnabledIf => &descriptor.enabled_if,
            Self::VisibleIf => &descriptor.visible_if,
            Self::Transformation => &descriptor.transformation_for_aggregation,
            Self::Aggregation => &descriptor.aggregation_expression,
        }
    }
}

impl fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Normalized form used to compare references
pub(crate) fn reference_key(reference: &str) -> String {
    reference.trim().to_lowercase()
}

/// A field of a protocol
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ValueDescriptor {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reference: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub short_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "Type", skip_serializing_if = "TypeOfValue::is_default")]
    pub value_type: TypeOfValue,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub available_values: Vec<ListItem>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub default_value: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub calculated_value: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub valid_if: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub validation_message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub warning_if: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub warning_message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub enabled_if: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub visible_if: String,
    #[serde(skip_serializing_if = "AggregationMode::is_default")]
    pub preferred_aggregation: AggregationMode,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub transformation_for_aggregation: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub aggregation_expression: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ValueDescriptor>,
}

impl ValueDescriptor {
    /// Editable field with the given reference
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            ..Self::default()
        }
    }

    /// Calculated field
    pub fn calculated(reference: impl Into<String>, expression: impl Into<String>) -> Self {
        Self::new(reference).with_calculated(expression)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_type(mut self, value_type: TypeOfValue) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn with_available_values(mut self, items: impl IntoIterator<Item = ListItem>) -> Self {
        self.available_values = items.into_iter().collect();
        self
    }

    pub fn with_default(mut self, expression: impl Into<String>) -> Self {
        self.default_value = expression.into();
        self
    }

    pub fn with_calculated(mut self, expression: impl Into<String>) -> Self {
        self.calculated_value = expression.into();
        self
    }

    pub fn with_valid_if(mut self, expression: impl Into<String>) -> Self {
        self.valid_if = expression.into();
        self
    }

    pub fn with_validation_message(mut self, message: impl Into<String>) -> Self {
        self.validation_message = message.into();
        self
    }

    pub fn with_warning_if(mut self, expression: impl Into<String>) -> Self {
        self.warning_if = expression.into();
        self
    }

    pub fn with_warning_message(mut self, message: impl Into<String>) -> Self {
        self.warning_message = message.into();
        self
    }

    pub fn with_enabled_if(mut self, expression: impl Into<String>) -> Self {
        self.enabled_if = expression.into();
        self
    }

    pub fn with_visible_if(mut self, expression: impl Into<String>) -> Self {
        self.visible_if = expression.into();
        self
    }

    pub fn with_aggregation(mut self, mode: AggregationMode) -> Self {
        self.preferred_aggregation = mode;
        self
    }

    pub fn with_transformation(mut self, expression: impl Into<String>) -> Self {
        self.transformation_for_aggregation = expression.into();
        self
    }

    pub fn with_aggregation_expression(mut self, expression: impl Into<String>) -> Self {
        self.aggregation_expression = expression.into();
        self
    }

    pub fn with_child(mut self, child: ValueDescriptor) -> Self {
        self.children.push(child);
        self
    }

    /// True when the field has a calculated expression
    pub fn is_calculated(&self) -> bool {
        !is_blank(&self.calculated_value)
    }

    /// True when the given expression slot is set
    pub fn has_expression(&self, kind: ExpressionKind) -> bool {
        !is_blank(kind.text(self))
    }

    /// Reference, or the name for fields without one
    pub fn display_name(&self) -> &str {
        if is_blank(&self.reference) {
            &self.name
        } else {
            &self.reference
        }
    }

    /// This descriptor followed by all of its descendants, depth-first
    pub fn descendants(&self) -> Vec<&ValueDescriptor> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    pub(crate) fn collect_into<'a>(&'a self, out: &mut Vec<&'a ValueDescriptor>) {
        out.push(self);
        for child in &self.children {
            child.collect_into(out);
        }
    }

    /// Check this field and its children for schema defects
    pub fn validate_model(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        self.validate_into(&mut issues);
        issues
    }

    fn validate_into(&self, issues: &mut Vec<Issue>) {
        let prefix = format!("Value '{}': ", self.display_name());
        let calculated = self.is_calculated();
        let custom_aggregation = !is_blank(&self.aggregation_expression);
        let transformation = !is_blank(&self.transformation_for_aggregation);

        if !calculated && is_blank(&self.reference) {
            issues.push(Issue::model_error(self, format!("{prefix}Editable field must have a reference ID.")));
        }

        if calculated && !self.available_values.is_empty() {
            issues.push(Issue::model_error(
                self,
                format!("{prefix}AvailableValues cannot be used for calculated fields."),
            ));
        }

        if calculated && !is_blank(&self.default_value) {
            issues.push(Issue::model_error(
                self,
                format!("{prefix}DefaultValue cannot be specified for calculated fields."),
            ));
        }

        if !is_blank(&self.validation_message) && is_blank(&self.valid_if) {
            issues.push(Issue::warning(
                self,
                format!("{prefix}ValidationMessage should not be specified without ValidIf."),
            ));
        }

        if !is_blank(&self.warning_message) && is_blank(&self.warning_if) {
            issues.push(Issue::warning(
                self,
                format!("{prefix}WarningMessage should not be specified without WarningIf."),
            ));
        }

        let numeric_mode = matches!(self.preferred_aggregation, AggregationMode::Sum | AggregationMode::Average);
        if self.value_type == TypeOfValue::String && numeric_mode && !transformation && !custom_aggregation {
            issues.push(Issue::model_error(
                self,
                format!(
                    "{prefix}Aggregation mode {} cannot be used for type String without a transformation expression.",
                    self.preferred_aggregation
                ),
            ));
        }

        if transformation && self.preferred_aggregation == AggregationMode::None && !custom_aggregation {
            issues.push(Issue::model_error(
                self,
                format!("{prefix}TransformationForAggregation cannot be specified with aggregation mode None."),
            ));
        }

        if custom_aggregation && self.preferred_aggregation != AggregationMode::None {
            issues.push(Issue::warning(
                self,
                format!("{prefix}PreferredAggregation is ignored when AggregationExpression is specified."),
            ));
        }

        for child in &self.children {
            child.validate_into(issues);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::IssueSeverity;
    use pretty_assertions::assert_eq;

    fn messages(descriptor: &ValueDescriptor) -> Vec<String> {
        descriptor.validate_model().into_iter().map(|issue| issue.message).collect()
    }

    #[test]
    fn test_valid_field_has_no_issues() {
        let field = ValueDescriptor::new("weight").with_valid_if("this > 0");
        assert!(field.validate_model().is_empty());
    }

    #[test]
    fn test_editable_field_requires_reference() {
        let field = ValueDescriptor::new("").with_name("Weight");
        assert_eq!(messages(&field), vec!["Value 'Weight': Editable field must have a reference ID."]);
    }

    #[test]
    fn test_calculated_field_with_default() {
        let field = ValueDescriptor::calculated("b", "a * 2").with_default("1");
        let issues = field.validate_model();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, IssueSeverity::ModelError);
        assert_eq!(issues[0].message, "Value 'b': DefaultValue cannot be specified for calculated fields.");
    }

    #[test]
    fn test_messages_without_rules_are_warnings() {
        let field = ValueDescriptor::new("a")
            .with_validation_message("bad")
            .with_warning_message("odd");
        let issues = field.validate_model();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|issue| issue.severity == IssueSeverity::Warning));
    }

    #[test]
    fn test_string_sum_requires_transformation() {
        let field = ValueDescriptor::new("s")
            .with_type(TypeOfValue::String)
            .with_aggregation(AggregationMode::Sum);
        assert_eq!(
            messages(&field),
            vec!["Value 's': Aggregation mode Sum cannot be used for type String without a transformation expression."]
        );

        let fixed = field.with_transformation("value == 'yes' ? 1 : 0");
        assert!(fixed.validate_model().is_empty());
    }

    #[test]
    fn test_transformation_requires_mode() {
        let field = ValueDescriptor::new("a").with_transformation("value * 2");
        assert_eq!(
            messages(&field),
            vec!["Value 'a': TransformationForAggregation cannot be specified with aggregation mode None."]
        );

        let custom = ValueDescriptor::new("a")
            .with_transformation("value * 2")
            .with_aggregation_expression("count(values)");
        assert!(custom.validate_model().is_empty());
    }

    #[test]
    fn test_children_are_validated() {
        let field = ValueDescriptor::new("parent").with_child(ValueDescriptor::new(" "));
        assert_eq!(field.validate_model().len(), 1);
    }

    #[test]
    fn test_expression_slots() {
        let field = ValueDescriptor::calculated("c", "a + b").with_enabled_if("a > 0");
        assert!(field.has_expression(ExpressionKind::Calculated));
        assert!(field.has_expression(ExpressionKind::EnabledIf));
        assert!(!field.has_expression(ExpressionKind::ValidIf));
        assert_eq!(ExpressionKind::Calculated.text(&field), "a + b");
    }
}
