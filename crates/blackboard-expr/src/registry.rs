//! Function registry for the expression engine
//!
//! Maps case-insensitive function names to their implementations. Most
//! functions receive already evaluated arguments; a few (`sum`, `let`, `if`)
//! need the unevaluated argument expressions and are registered as lazy.

use crate::ast::Expr;
use crate::context::EvaluationContext;
use crate::engine::Engine;
use crate::error::{EvalError, EvalResult};
use crate::operators;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Implementation receiving evaluated arguments
pub type NaryFn = Arc<dyn Fn(&[Value], &mut EvaluationContext<'_>) -> EvalResult<Value> + Send + Sync>;

/// Implementation receiving the argument expressions
pub type LazyFn =
    Arc<dyn Fn(&Engine, &[Expr], &mut EvaluationContext<'_>) -> EvalResult<Value> + Send + Sync>;

#[derive(Clone)]
pub enum FunctionImpl {
    Eager(NaryFn),
    Lazy(LazyFn),
}

/// A registered function with its accepted arity
#[derive(Clone)]
pub struct FunctionDefinition {
    pub name: String,
    pub min_args: usize,
    /// `None` for variadic functions
    pub max_args: Option<usize>,
    pub implementation: FunctionImpl,
}

impl FunctionDefinition {
    pub fn eager<F>(name: impl Into<String>, min_args: usize, max_args: Option<usize>, f: F) -> Self
    where
        F: Fn(&[Value], &mut EvaluationContext<'_>) -> EvalResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            min_args,
            max_args,
            implementation: FunctionImpl::Eager(Arc::new(f)),
        }
    }

    pub fn lazy<F>(name: impl Into<String>, min_args: usize, max_args: Option<usize>, f: F) -> Self
    where
        F: Fn(&Engine, &[Expr], &mut EvaluationContext<'_>) -> EvalResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            min_args,
            max_args,
            implementation: FunctionImpl::Lazy(Arc::new(f)),
        }
    }

    /// Check the number of arguments
    pub fn check_arity(&self, count: usize) -> EvalResult<()> {
        let fits = count >= self.min_args && self.max_args.is_none_or(|max| count <= max);
        if fits {
            Ok(())
        } else {
            Err(EvalError::argument_count(&self.name, self.arity_text(), count))
        }
    }

    fn arity_text(&self) -> String {
        match self.max_args {
            Some(max) if max == self.min_args => max.to_string(),
            Some(max) => format!("{} to {}", self.min_args, max),
            None => format!("at least {}", self.min_args),
        }
    }
}

impl fmt::Debug for FunctionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDefinition")
            .field("name", &self.name)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .finish_non_exhaustive()
    }
}

/// Registry for function definitions
#[derive(Default, Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionDefinition>,
}

impl FunctionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all built-in functions registered
    pub fn with_standard_functions() -> Self {
        let mut registry = Self::new();
        operators::aggregate::register(&mut registry);
        operators::math::register(&mut registry);
        registry
    }

    /// Register a function, replacing any previous one with the same name
    pub fn register(&mut self, definition: FunctionDefinition) {
        self.functions.insert(definition.name.to_lowercase(), definition);
    }

    pub fn get(&self, name: &str) -> Option<&FunctionDefinition> {
        self.functions.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.values().map(|def| def.name.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}
