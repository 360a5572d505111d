//! OpenBlackboard error types

use crate::{ErrorCode, SourceLocation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A hard failure prepared for display
///
/// Parse failures carry the offending expression and where in it parsing
/// stopped; other failures carry the help text registered for their code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub message: String,
    /// Expression text, for parse failures
    pub expression: Option<String>,
    pub location: Option<SourceLocation>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            expression: None,
            location: None,
            help: code.info().help.map(str::to_string),
        }
    }

    pub fn with_expression(mut self, expression: impl Into<String>, location: Option<SourceLocation>) -> Self {
        self.expression = Some(expression.into());
        self.location = location;
        self
    }

    /// Caret line under a single-line expression
    fn pointer(&self) -> Option<String> {
        let expression = self.expression.as_deref()?;
        let location = self.location.as_ref()?;
        if expression.contains('\n') {
            return None;
        }
        let width = expression
            .get(location.offset..location.offset + location.length)
            .map_or(1, |text| text.chars().count().max(1));
        Some(format!("{}{}", " ".repeat(location.column.saturating_sub(1)), "^".repeat(width)))
    }

    /// Render with terminal colors
    #[cfg(feature = "colored")]
    pub fn render_colored(&self) -> String {
        use colored::Colorize;

        let mut out = format!("{}: {}", format!("error[{}]", self.code).red().bold(), self.message);
        if let Some(expression) = &self.expression {
            out.push_str(&format!("\n  {} {}", "|".blue(), expression));
            if let Some(pointer) = self.pointer() {
                out.push_str(&format!("\n  {} {}", "|".blue(), pointer.red()));
            }
        }
        if let Some(help) = &self.help {
            out.push_str(&format!("\n  {} {}", "help:".green(), help));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error[{}]: {}", self.code, self.message)?;
        if let Some(expression) = &self.expression {
            write!(f, "\n  | {}", expression)?;
            if let Some(pointer) = self.pointer() {
                write!(f, "\n  | {}", pointer)?;
            }
        }
        if let Some(help) = &self.help {
            write!(f, "\n  help: {}", help)?;
        }
        Ok(())
    }
}

/// Main OpenBlackboard error type
///
/// These are hard failures reported at the call site. Data and model
/// findings collected while calculating a data set are issues, not errors.
#[derive(Debug, Clone, Error)]
pub enum BlackboardError {
    /// Expression syntax error
    #[error("{code}: {message}")]
    Parse {
        code: ErrorCode,
        message: String,
        expression: String,
        location: Option<SourceLocation>,
    },

    /// Expression runtime error
    #[error("{code}: {message}")]
    Evaluation { code: ErrorCode, message: String },

    /// Protocol model error
    #[error("{code}: {message}")]
    Model { code: ErrorCode, message: String },

    /// Invalid argument passed to a public operation
    #[error("{code}: {message}")]
    Argument { code: ErrorCode, message: String },

    /// Value conversion error
    #[error("{code}: {message}")]
    Conversion { code: ErrorCode, message: String },

    /// Aggregation precondition error
    #[error("{code}: {message}")]
    Aggregation { code: ErrorCode, message: String },

    /// Storage or I/O error
    #[error("{code}: {message}")]
    Storage {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },

    /// Multiple errors collected
    #[error("Multiple errors: {}", .0.len())]
    Multiple(Vec<BlackboardError>),
}

impl BlackboardError {
    /// Create a parse error
    pub fn parse(code: ErrorCode, message: impl Into<String>, expression: impl Into<String>) -> Self {
        Self::Parse {
            code,
            message: message.into(),
            expression: expression.into(),
            location: None,
        }
    }

    /// Create a parse error with location
    pub fn parse_at(
        code: ErrorCode,
        message: impl Into<String>,
        expression: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        Self::Parse {
            code,
            message: message.into(),
            expression: expression.into(),
            location: Some(location),
        }
    }

    /// Create an evaluation error
    pub fn evaluation(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Evaluation {
            code,
            message: message.into(),
        }
    }

    /// Create a model error
    pub fn model(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Model {
            code,
            message: message.into(),
        }
    }

    /// Create an argument error
    pub fn argument(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Argument {
            code,
            message: message.into(),
        }
    }

    /// Create a conversion error
    pub fn conversion(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Conversion {
            code,
            message: message.into(),
        }
    }

    /// Create an aggregation error
    pub fn aggregation(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Aggregation {
            code,
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Storage {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Attach context to a storage error, other variants are returned unchanged
    pub fn with_context(self, ctx: impl Into<String>) -> Self {
        match self {
            Self::Storage { code, message, .. } => Self::Storage {
                code,
                message,
                context: Some(ctx.into()),
            },
            other => other,
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Parse { code, .. } => *code,
            Self::Evaluation { code, .. } => *code,
            Self::Model { code, .. } => *code,
            Self::Argument { code, .. } => *code,
            Self::Conversion { code, .. } => *code,
            Self::Aggregation { code, .. } => *code,
            Self::Storage { code, .. } => *code,
            Self::Multiple(errors) => errors.first().map(|e| e.code()).unwrap_or(ErrorCode::new(0)),
        }
    }

    /// Get the message without the code prefix
    pub fn message(&self) -> String {
        match self {
            Self::Parse { message, .. }
            | Self::Evaluation { message, .. }
            | Self::Model { message, .. }
            | Self::Argument { message, .. }
            | Self::Conversion { message, .. }
            | Self::Aggregation { message, .. }
            | Self::Storage { message, .. } => message.clone(),
            Self::Multiple(errors) => errors
                .iter()
                .map(|e| e.message())
                .collect::<Vec<_>>()
                .join("; "),
        }
    }

    /// Get the location if available
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Parse { location, .. } => location.as_ref(),
            _ => None,
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::Parse {
                code,
                message,
                expression,
                location,
            } => Diagnostic::new(*code, message.clone()).with_expression(expression.clone(), location.clone()),
            Self::Storage {
                code,
                message,
                context: Some(context),
            } => Diagnostic::new(*code, format!("{} ({})", message, context)),
            Self::Multiple(errors) => match errors.first() {
                Some(first) => first.to_diagnostic(),
                None => Diagnostic::new(ErrorCode::new(0), "Unknown error"),
            },
            other => Diagnostic::new(other.code(), other.message()),
        }
    }
}

impl From<std::io::Error> for BlackboardError {
    fn from(err: std::io::Error) -> Self {
        let code = if err.kind() == std::io::ErrorKind::NotFound {
            crate::BB0404
        } else {
            crate::BB0401
        };
        Self::storage(code, err.to_string())
    }
}
