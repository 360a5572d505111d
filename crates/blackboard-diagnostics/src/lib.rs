//! OpenBlackboard diagnostics and error handling
//!
//! This crate provides the error infrastructure shared by the expression
//! engine, the protocol model and the command line tool: numbered error
//! codes, the [`BlackboardError`] type and source locations for expression
//! parse failures.

mod error;
mod error_code;
mod span;

pub use error::*;
pub use error_code::*;
pub use span::*;

/// Result type for OpenBlackboard operations
pub type Result<T> = std::result::Result<T, BlackboardError>;
