//! Evaluation errors for the expression engine

use blackboard_diagnostics::{
    BB0100, BB0101, BB0102, BB0103, BB0104, BB0105, BB0106, BB0107, BlackboardError, ErrorCode,
};
use thiserror::Error;

/// Result type for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors that can occur while evaluating an expression
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    /// Identifier not bound by a let, a projection or the host resolver
    #[error("Parameter '{name}' was not defined")]
    UnresolvedIdentifier { name: String },

    /// Function name not present in the registry
    #[error("Function '{name}' is not defined")]
    UndefinedFunction { name: String },

    /// Wrong number of arguments for a function
    #[error("Function '{name}' expects {expected} argument(s), found {found}")]
    InvalidArgumentCount {
        name: String,
        expected: String,
        found: usize,
    },

    /// Operand types not supported by an operator or function
    #[error("Type mismatch in {operation}: {message}")]
    TypeMismatch { operation: String, message: String },

    /// Division or modulo by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Maximum nesting depth exceeded
    #[error("Maximum recursion depth exceeded")]
    RecursionLimit,

    /// Value could not be converted
    #[error("Cannot convert {value} to {target}")]
    Conversion { value: String, target: String },

    /// Error raised by the host while resolving a value
    #[error("{message}")]
    Host { message: String },
}

impl EvalError {
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self::UnresolvedIdentifier { name: name.into() }
    }

    pub fn undefined_function(name: impl Into<String>) -> Self {
        Self::UndefinedFunction { name: name.into() }
    }

    pub fn argument_count(name: impl Into<String>, expected: impl Into<String>, found: usize) -> Self {
        Self::InvalidArgumentCount {
            name: name.into(),
            expected: expected.into(),
            found,
        }
    }

    pub fn type_mismatch(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn conversion(value: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Conversion {
            value: value.into(),
            target: target.into(),
        }
    }

    pub fn host(message: impl Into<String>) -> Self {
        Self::Host {
            message: message.into(),
        }
    }

    /// Error code used when this error crosses into [`BlackboardError`]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnresolvedIdentifier { .. } => BB0100,
            Self::UndefinedFunction { .. } => BB0101,
            Self::InvalidArgumentCount { .. } => BB0102,
            Self::TypeMismatch { .. } => BB0103,
            Self::DivisionByZero => BB0104,
            Self::RecursionLimit => BB0105,
            Self::Conversion { .. } => BB0106,
            Self::Host { .. } => BB0107,
        }
    }
}

impl From<EvalError> for BlackboardError {
    fn from(err: EvalError) -> Self {
        BlackboardError::evaluation(err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_message() {
        let err = EvalError::unresolved("a");
        assert_eq!(err.to_string(), "Parameter 'a' was not defined");
        assert_eq!(err.code(), BB0100);
    }

    #[test]
    fn test_into_blackboard_error() {
        let err: BlackboardError = EvalError::DivisionByZero.into();
        assert_eq!(err.code(), BB0104);
        assert_eq!(err.message(), "Division by zero");
    }
}
