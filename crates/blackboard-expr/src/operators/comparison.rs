//! Equality and ordering

use crate::ast::BinaryOp;
use crate::error::{EvalError, EvalResult};
use crate::value::Value;
use std::cmp::Ordering;

/// Null-safe equality; strings compare case-insensitively and numeric
/// strings compare equal to the number they spell
pub fn equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::String(a), Value::String(b)) => a.to_lowercase() == b.to_lowercase(),
        (Value::Number(n), s @ Value::String(_)) | (s @ Value::String(_), Value::Number(n)) => {
            s.to_invariant_number() == Some(*n)
        }
        (Value::Boolean(b), Value::String(s)) | (Value::String(s), Value::Boolean(b)) => {
            s.trim().eq_ignore_ascii_case(if *b { "true" } else { "false" })
        }
        (Value::Sequence(a), Value::Sequence(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| equals(x, y))
        }
        _ => false,
    }
}

fn ordering(op: BinaryOp, left: &Value, right: &Value) -> EvalResult<Ordering> {
    if let (Some(a), Some(b)) = (left.to_invariant_number(), right.to_invariant_number()) {
        return a
            .partial_cmp(&b)
            .ok_or_else(|| EvalError::type_mismatch(op.symbol(), "NaN cannot be ordered"));
    }
    match (left, right) {
        (Value::String(a), Value::String(b)) => Ok(a.to_lowercase().cmp(&b.to_lowercase())),
        (Value::Boolean(a), Value::Boolean(b)) => Ok(a.cmp(b)),
        _ => Err(EvalError::type_mismatch(
            op.symbol(),
            format!("cannot compare {} with {}", left.type_name(), right.type_name()),
        )),
    }
}

/// Relational comparison; null on either side yields null
pub fn compare(op: BinaryOp, left: &Value, right: &Value) -> EvalResult<Value> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }

    let ord = ordering(op, left, right)?;
    let result = match op {
        BinaryOp::Less => ord == Ordering::Less,
        BinaryOp::LessOrEqual => ord != Ordering::Greater,
        BinaryOp::Greater => ord == Ordering::Greater,
        BinaryOp::GreaterOrEqual => ord != Ordering::Less,
        other => return Err(EvalError::type_mismatch(other.symbol(), "not a relational operator")),
    };
    Ok(Value::Boolean(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equals() {
        assert!(equals(&Value::Null, &Value::Null));
        assert!(!equals(&Value::Null, &Value::from(0)));
        assert!(equals(&Value::from("Male"), &Value::from("male")));
        assert!(equals(&Value::from("1"), &Value::from(1)));
        assert!(equals(&Value::from("True"), &Value::Boolean(true)));
        assert!(!equals(&Value::from(1), &Value::Boolean(true)));
    }

    #[test]
    fn test_compare() {
        assert_eq!(compare(BinaryOp::Less, &Value::from(1), &Value::from(2)).unwrap(), Value::Boolean(true));
        assert_eq!(compare(BinaryOp::GreaterOrEqual, &Value::from("5"), &Value::from(5)).unwrap(), Value::Boolean(true));
        assert_eq!(compare(BinaryOp::Less, &Value::from("a"), &Value::from("B")).unwrap(), Value::Boolean(true));
        assert_eq!(compare(BinaryOp::Greater, &Value::Null, &Value::from(1)).unwrap(), Value::Null);
        assert!(compare(BinaryOp::Less, &Value::from("a"), &Value::from(1)).is_err());
    }
}
