//! Operator and built-in function implementations
//!
//! - `arithmetic`: `+ - * / %` and negation, with null propagation
//! - `comparison`: equality and ordering
//! - `logical`: boolean coercion and `not`
//! - `aggregate`: `isnull`, `count`, `average`, `sum`, `let`, `sequence`
//! - `math`: numeric functions plus `if` and `in`

pub mod aggregate;
pub mod arithmetic;
pub mod comparison;
pub mod logical;
pub mod math;
