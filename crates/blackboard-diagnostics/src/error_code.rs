//! Error codes following a structured numbering system
//!
//! Error code ranges:
//! - BB0001-BB0099: Parse errors (expression syntax)
//! - BB0100-BB0199: Evaluation errors (expression runtime)
//! - BB0200-BB0299: Model errors (protocol schema)
//! - BB0300-BB0399: Usage errors (arguments, conversions, aggregation)
//! - BB0400-BB0499: System errors (I/O, storage format)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if this is a parse error (0001-0099)
    pub const fn is_parse_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Check if this is an evaluation error (0100-0199)
    pub const fn is_evaluation_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is a model error (0200-0299)
    pub const fn is_model_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Check if this is a usage error (0300-0399)
    pub const fn is_usage_error(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    /// Check if this is a system error (0400-0499)
    pub const fn is_system_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BB{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Parse errors (0001-0099)
    map.insert(1, ErrorInfo::new("Unexpected token"));
    map.insert(2, ErrorInfo::new("Unexpected end of expression"));
    map.insert(3, ErrorInfo::new("Unterminated string literal"));
    map.insert(4, ErrorInfo::new("Invalid number format"));
    map.insert(5, ErrorInfo::new("Missing closing delimiter"));
    map.insert(6, ErrorInfo::new("Expected expression"));
    map.insert(7, ErrorInfo::new("Unexpected trailing input"));
    map.insert(
        8,
        ErrorInfo::new("Expression nested too deeply")
            .with_help("Split the expression into intermediate calculated values"),
    );

    // Evaluation errors (0100-0199)
    map.insert(100, ErrorInfo::new("Unresolved identifier")
        .with_help("Check that the referenced field has a value or use the `[name?]` form"));
    map.insert(101, ErrorInfo::new("Unknown function"));
    map.insert(102, ErrorInfo::new("Invalid argument count"));
    map.insert(103, ErrorInfo::new("Type mismatch"));
    map.insert(104, ErrorInfo::new("Division by zero"));
    map.insert(105, ErrorInfo::new("Recursion limit exceeded"));
    map.insert(106, ErrorInfo::new("Invalid conversion"));
    map.insert(107, ErrorInfo::new("Evaluation failed"));

    // Model errors (0200-0299)
    map.insert(200, ErrorInfo::new("Invalid protocol model"));
    map.insert(201, ErrorInfo::new("Duplicate reference ID"));

    // Usage errors (0300-0399)
    map.insert(300, ErrorInfo::new("Missing reference ID"));
    map.insert(301, ErrorInfo::new("Unknown reference ID"));
    map.insert(302, ErrorInfo::new("Descriptor does not belong to protocol"));
    map.insert(310, ErrorInfo::new("Invalid number format"));
    map.insert(311, ErrorInfo::new("Numeric overflow"));
    map.insert(312, ErrorInfo::new("Invalid cast")
        .with_help("Boolean values cannot be used where a numeric field is expected"));
    map.insert(320, ErrorInfo::new("Protocol mismatch"));
    map.insert(321, ErrorInfo::new("Culture mismatch"));
    map.insert(322, ErrorInfo::new("Data set contains errors")
        .with_help("Only data sets without errors can be aggregated"));
    map.insert(330, ErrorInfo::new("Unknown center"));
    map.insert(331, ErrorInfo::new("Unknown submission"));
    map.insert(332, ErrorInfo::new("Submission does not belong to protocol"));

    // System errors (0400-0499)
    map.insert(400, ErrorInfo::new("Internal error"));
    map.insert(401, ErrorInfo::new("I/O error"));
    map.insert(404, ErrorInfo::new("File not found"));
    map.insert(406, ErrorInfo::new("Invalid format"));

    map
});

// Parse errors
pub const BB0001: ErrorCode = ErrorCode::new(1);
pub const BB0002: ErrorCode = ErrorCode::new(2);
pub const BB0003: ErrorCode = ErrorCode::new(3);
pub const BB0004: ErrorCode = ErrorCode::new(4);
pub const BB0005: ErrorCode = ErrorCode::new(5);
pub const BB0006: ErrorCode = ErrorCode::new(6);
pub const BB0007: ErrorCode = ErrorCode::new(7);
pub const BB0008: ErrorCode = ErrorCode::new(8);

// Evaluation errors
pub const BB0100: ErrorCode = ErrorCode::new(100);
pub const BB0101: ErrorCode = ErrorCode::new(101);
pub const BB0102: ErrorCode = ErrorCode::new(102);
pub const BB0103: ErrorCode = ErrorCode::new(103);
pub const BB0104: ErrorCode = ErrorCode::new(104);
pub const BB0105: ErrorCode = ErrorCode::new(105);
pub const BB0106: ErrorCode = ErrorCode::new(106);
pub const BB0107: ErrorCode = ErrorCode::new(107);

// Model errors
pub const BB0200: ErrorCode = ErrorCode::new(200);
pub const BB0201: ErrorCode = ErrorCode::new(201);

// Usage errors
pub const BB0300: ErrorCode = ErrorCode::new(300);
pub const BB0301: ErrorCode = ErrorCode::new(301);
pub const BB0302: ErrorCode = ErrorCode::new(302);
pub const BB0310: ErrorCode = ErrorCode::new(310);
pub const BB0311: ErrorCode = ErrorCode::new(311);
pub const BB0312: ErrorCode = ErrorCode::new(312);
pub const BB0320: ErrorCode = ErrorCode::new(320);
pub const BB0321: ErrorCode = ErrorCode::new(321);
pub const BB0322: ErrorCode = ErrorCode::new(322);
pub const BB0330: ErrorCode = ErrorCode::new(330);
pub const BB0331: ErrorCode = ErrorCode::new(331);
pub const BB0332: ErrorCode = ErrorCode::new(332);

// System errors
pub const BB0400: ErrorCode = ErrorCode::new(400);
pub const BB0401: ErrorCode = ErrorCode::new(401);
pub const BB0404: ErrorCode = ErrorCode::new(404);
pub const BB0406: ErrorCode = ErrorCode::new(406);
