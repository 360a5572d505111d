//! CLI functionality for the blackboard tool
//!
//! This module contains all CLI-related functionality including:
//! - Protocol validation and canonical formatting
//! - Data set calculation
//! - Aggregation of submissions
//! - Input loading, logging setup and output formatting

pub mod aggregate;
pub mod calculate;
pub mod format;
pub mod input;
pub mod logging;
pub mod output;
pub mod validate;
