//! Arithmetic operators
//!
//! Null operands propagate. `+` concatenates when either side is a string;
//! other operators accept numeric strings.

use crate::ast::BinaryOp;
use crate::error::{EvalError, EvalResult};
use crate::value::Value;

/// Numeric operand, `None` for null
pub(crate) fn operand(operation: &str, value: &Value) -> EvalResult<Option<f64>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(Some(*n)),
        Value::String(s) => value
            .to_invariant_number()
            .map(Some)
            .ok_or_else(|| EvalError::type_mismatch(operation, format!("'{}' is not a number", s))),
        other => Err(EvalError::type_mismatch(
            operation,
            format!("{} is not a number", other.type_name()),
        )),
    }
}

pub fn binary(op: BinaryOp, left: &Value, right: &Value) -> EvalResult<Value> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }

    if op == BinaryOp::Add && (matches!(left, Value::String(_)) || matches!(right, Value::String(_))) {
        return Ok(Value::String(format!("{}{}", left, right)));
    }

    let symbol = op.symbol();
    let (Some(a), Some(b)) = (operand(symbol, left)?, operand(symbol, right)?) else {
        return Ok(Value::Null);
    };

    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Subtract => a - b,
        BinaryOp::Multiply => a * b,
        BinaryOp::Divide => {
            if b == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            a / b
        }
        BinaryOp::Modulo => {
            if b == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            a % b
        }
        other => {
            return Err(EvalError::type_mismatch(other.symbol(), "not an arithmetic operator"));
        }
    };

    Ok(Value::Number(result))
}

pub fn negate(value: &Value) -> EvalResult<Value> {
    Ok(operand("-", value)?.map_or(Value::Null, |n| Value::Number(-n)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(BinaryOp::Add, 2.0, 3.0, 5.0)]
    #[case(BinaryOp::Subtract, 2.0, 3.0, -1.0)]
    #[case(BinaryOp::Multiply, 2.0, 3.0, 6.0)]
    #[case(BinaryOp::Divide, 10.0, 4.0, 2.5)]
    #[case(BinaryOp::Modulo, 10.0, 4.0, 2.0)]
    fn test_numeric(#[case] op: BinaryOp, #[case] a: f64, #[case] b: f64, #[case] expected: f64) {
        assert_eq!(binary(op, &Value::Number(a), &Value::Number(b)).unwrap(), Value::Number(expected));
    }

    #[test]
    fn test_null_propagates() {
        assert_eq!(binary(BinaryOp::Add, &Value::Null, &Value::from(1)).unwrap(), Value::Null);
        assert_eq!(negate(&Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(binary(BinaryOp::Add, &Value::from("kg "), &Value::from(2)).unwrap(), Value::from("kg 2"));
    }

    #[test]
    fn test_numeric_strings() {
        assert_eq!(binary(BinaryOp::Multiply, &Value::from("2"), &Value::from(3)).unwrap(), Value::from(6));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(binary(BinaryOp::Divide, &Value::from(1), &Value::from(0)), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn test_boolean_operand_rejected() {
        assert!(matches!(
            binary(BinaryOp::Subtract, &Value::Boolean(true), &Value::from(1)),
            Err(EvalError::TypeMismatch { .. })
        ));
    }
}
