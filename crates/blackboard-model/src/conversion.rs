//! Culture-aware conversion of loosely-typed values
//!
//! Data set values arrive as whatever the submitter provided. Before a value
//! takes part in numeric aggregation or a boolean condition it is converted
//! according to the declared type of its field:
//!
//! - `String` fields are never converted to numbers
//! - `Boolean` fields convert through [`to_boolean`] and map to `1`/`0`
//! - `Double` fields reject booleans and parse strings with the culture

use crate::descriptor::{TypeOfValue, ValueDescriptor};
use blackboard_diagnostics::{BB0310, BB0311, BB0312, BlackboardError, Result};
use blackboard_expr::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number and boolean formatting conventions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Culture {
    /// Culture name, empty for the invariant culture
    pub name: String,
    pub decimal_separator: char,
    pub group_separator: char,
    pub true_literal: String,
    pub false_literal: String,
}

impl Default for Culture {
    fn default() -> Self {
        Self::invariant()
    }
}

impl Culture {
    fn new(name: &str, decimal: char, group: char, true_literal: &str, false_literal: &str) -> Self {
        Self {
            name: name.to_string(),
            decimal_separator: decimal,
            group_separator: group,
            true_literal: true_literal.to_string(),
            false_literal: false_literal.to_string(),
        }
    }

    /// The culture-independent conventions (`1,234.5`, `true`/`false`)
    pub fn invariant() -> Self {
        Self::new("", '.', ',', "true", "false")
    }

    /// Look up a known culture by name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let culture = match name.trim().to_ascii_lowercase().as_str() {
            "" | "invariant" => Self::invariant(),
            "en-us" => Self::new("en-US", '.', ',', "true", "false"),
            "en-gb" => Self::new("en-GB", '.', ',', "true", "false"),
            "it-it" => Self::new("it-IT", ',', '.', "vero", "falso"),
            "de-de" => Self::new("de-DE", ',', '.', "wahr", "falsch"),
            "fr-fr" => Self::new("fr-FR", ',', ' ', "vrai", "faux"),
            "es-es" => Self::new("es-ES", ',', '.', "verdadero", "falso"),
            _ => return None,
        };
        Some(culture)
    }

    pub fn is_invariant(&self) -> bool {
        self.name.is_empty()
    }

    /// Parse a number written with this culture's separators
    pub fn parse_number(&self, text: &str) -> Result<f64> {
        let trimmed = text.trim();
        let mut normalized = String::with_capacity(trimmed.len());
        for c in trimmed.chars() {
            if c == self.decimal_separator {
                normalized.push('.');
            } else if c == self.group_separator
                || (self.group_separator == ' ' && c.is_whitespace())
            {
                continue;
            } else if c.is_ascii_digit() || matches!(c, '+' | '-' | 'e' | 'E') {
                normalized.push(c);
            } else {
                return Err(format_error(text));
            }
        }

        let number = normalized.parse::<f64>().map_err(|_| format_error(text))?;
        if !number.is_finite() {
            return Err(BlackboardError::conversion(
                BB0311,
                format!("Value '{}' is outside the range of a number.", text),
            ));
        }
        Ok(number)
    }
}

impl fmt::Display for Culture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invariant() {
            f.write_str("invariant")
        } else {
            f.write_str(&self.name)
        }
    }
}

fn format_error(text: &str) -> BlackboardError {
    BlackboardError::conversion(BB0310, format!("Value '{}' is not a valid number.", text))
}

fn invalid_cast(from: &Value, to: &str) -> BlackboardError {
    BlackboardError::conversion(
        BB0312,
        format!("Cannot convert a value of type {} to {}.", from.type_name(), to),
    )
}

/// Convert a value to the numeric domain of a field
///
/// Returns `Ok(None)` when the field is string-typed or the value is null.
pub fn to_number(descriptor: &ValueDescriptor, culture: &Culture, value: &Value) -> Result<Option<f64>> {
    to_number_as(descriptor.value_type, culture, value)
}

/// [`to_number`] for an explicit declared type
pub fn to_number_as(value_type: TypeOfValue, culture: &Culture, value: &Value) -> Result<Option<f64>> {
    match value_type {
        TypeOfValue::String => Ok(None),
        TypeOfValue::Boolean => Ok(Some(if to_boolean(culture, value)? { 1.0 } else { 0.0 })),
        TypeOfValue::Double => match value {
            Value::Null => Ok(None),
            Value::Number(n) => Ok(Some(*n)),
            Value::String(s) => culture.parse_number(s).map(Some),
            Value::Boolean(_) | Value::Sequence(_) => Err(invalid_cast(value, "Double")),
        },
    }
}

/// Convert a value to a boolean
pub fn to_boolean(culture: &Culture, value: &Value) -> Result<bool> {
    match value {
        Value::Null => Ok(false),
        Value::Boolean(b) => Ok(*b),
        Value::Number(n) => Ok(*n != 0.0),
        Value::String(s) => {
            let text = s.trim();
            if text.eq_ignore_ascii_case(&culture.true_literal) || text.eq_ignore_ascii_case("true") {
                Ok(true)
            } else if text.eq_ignore_ascii_case(&culture.false_literal) || text.eq_ignore_ascii_case("false") {
                Ok(false)
            } else {
                culture
                    .parse_number(text)
                    .map(|n| n != 0.0)
                    .map_err(|_| {
                        BlackboardError::conversion(BB0310, format!("Value '{}' is not a valid boolean.", s))
                    })
            }
        }
        Value::Sequence(_) => Err(invalid_cast(value, "Boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(value_type: TypeOfValue) -> ValueDescriptor {
        ValueDescriptor::new("a").with_type(value_type)
    }

    #[test]
    fn test_string_field_is_never_numeric() {
        let result = to_number(&field(TypeOfValue::String), &Culture::invariant(), &Value::from("10"));
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn test_culture_separators() {
        let italian = Culture::from_name("it-IT").unwrap();
        assert_eq!(italian.parse_number("1.234,5").unwrap(), 1234.5);
        assert_eq!(Culture::invariant().parse_number(" 1,234.5 ").unwrap(), 1234.5);
    }

    #[test]
    fn test_rejects_non_numeric_words() {
        assert_eq!(Culture::invariant().parse_number("inf").unwrap_err().code(), BB0310);
        assert_eq!(Culture::invariant().parse_number("1e400").unwrap_err().code(), BB0311);
    }

    #[test]
    fn test_culture_boolean_literals() {
        let german = Culture::from_name("de-DE").unwrap();
        assert!(to_boolean(&german, &Value::from("WAHR")).unwrap());
        assert!(!to_boolean(&german, &Value::from("falsch")).unwrap());
        assert!(to_boolean(&german, &Value::from("true")).unwrap());
    }

    #[test]
    fn test_unknown_culture() {
        assert!(Culture::from_name("xx-YY").is_none());
        assert_eq!(Culture::from_name("EN-us").unwrap().name, "en-US");
    }
}
