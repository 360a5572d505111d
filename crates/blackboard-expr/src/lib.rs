//! Expression micro-language for OpenBlackboard protocols
//!
//! Field rules (defaults, calculated values, validity and warning conditions,
//! aggregation transformations) are written in a small expression language:
//!
//! - **Literals**: numbers, single-quoted strings, `true`, `false`, `null`
//! - **Identifiers**: `weight`, `[Body weight]`, and the missing-tolerant `[weight?]`
//! - **Operators**: `?:`, `or`/`||`, `and`/`&&`, `== != <>`, `< <= > >=`, `+ -`, `* / %`, `! not -`
//! - **Functions**: `isnull`, `count`, `average`, `sum`, `let`, `sequence` and a math table
//!
//! # Example
//!
//! ```
//! use blackboard_expr::{Engine, MapResolver, Value};
//!
//! let engine = Engine::new();
//! let resolver = MapResolver::new().with("weight", 80).with("height", 200);
//! let bmi = engine.evaluate_str("weight / pow(height / 100, 2)", &resolver).unwrap();
//! assert_eq!(bmi, Value::Number(20.0));
//! ```
//!
//! # Architecture
//!
//! - `parser`: winnow based recursive descent parser producing [`Expr`]
//! - [`Engine`]: evaluates expressions, caches parsed trees
//! - [`EvaluationContext`]: `let`/projection scopes plus the host [`Resolver`]
//! - [`FunctionRegistry`]: case-insensitive function table

pub mod ast;
pub mod context;
pub mod engine;
pub mod error;
pub mod operators;
pub mod parser;
pub mod registry;
pub mod value;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use context::{EvaluationContext, MapResolver, NoBindings, Resolver};
pub use engine::Engine;
pub use error::{EvalError, EvalResult};
pub use operators::logical::truthy;
pub use parser::parse_expression;
pub use registry::{FunctionDefinition, FunctionImpl, FunctionRegistry, LazyFn, NaryFn};
pub use value::Value;
