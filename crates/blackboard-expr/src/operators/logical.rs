//! Boolean coercion used by conditions and logical operators

use crate::error::{EvalError, EvalResult};
use crate::value::Value;

/// Coerce a value to a boolean condition
///
/// Null is false, numbers are true when nonzero, strings accept `true` /
/// `false` or a number.
pub fn truthy(value: &Value) -> EvalResult<bool> {
    match value {
        Value::Null => Ok(false),
        Value::Boolean(b) => Ok(*b),
        Value::Number(n) => Ok(*n != 0.0),
        Value::String(s) => {
            let text = s.trim();
            if text.eq_ignore_ascii_case("true") {
                Ok(true)
            } else if text.eq_ignore_ascii_case("false") {
                Ok(false)
            } else {
                value
                    .to_invariant_number()
                    .map(|n| n != 0.0)
                    .ok_or_else(|| EvalError::conversion(format!("'{}'", s), "Boolean"))
            }
        }
        Value::Sequence(_) => Err(EvalError::conversion("Sequence", "Boolean")),
    }
}

pub fn not(value: &Value) -> EvalResult<Value> {
    Ok(Value::Boolean(!truthy(value)?))
}
