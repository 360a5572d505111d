//! Evaluation context: identifier scopes and the host resolver

use crate::error::{EvalError, EvalResult};
use crate::value::Value;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Default maximum nesting depth for a single evaluation
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Host callback used to resolve identifiers not bound inside the expression
///
/// Names are passed exactly as written (including a trailing `?`).
pub trait Resolver {
    /// Resolve an identifier. `Ok(None)` means the name is unknown.
    fn resolve(&self, name: &str) -> EvalResult<Option<Value>>;

    /// Numeric view of a value for aggregate functions (`sum`, `average`).
    /// `None` skips the value.
    fn to_number(&self, value: &Value) -> Option<f64> {
        value.to_invariant_number()
    }
}

/// Resolver that knows no identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBindings;

impl Resolver for NoBindings {
    fn resolve(&self, _name: &str) -> EvalResult<Option<Value>> {
        Ok(None)
    }
}

/// Case-insensitive map of names to values
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    values: HashMap<String, Value>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.values.insert(name.to_lowercase(), value.into());
    }
}

impl Resolver for MapResolver {
    fn resolve(&self, name: &str) -> EvalResult<Option<Value>> {
        Ok(self.values.get(&name.to_lowercase()).cloned())
    }
}

type Scope = HashMap<String, Value>;

/// State for one expression evaluation
pub struct EvaluationContext<'r> {
    resolver: &'r dyn Resolver,
    /// Binding scopes, innermost last; index 0 holds `let` bindings
    scopes: SmallVec<[Scope; 4]>,
    depth: usize,
    max_depth: usize,
}

impl<'r> EvaluationContext<'r> {
    pub fn new(resolver: &'r dyn Resolver) -> Self {
        let mut scopes = SmallVec::new();
        scopes.push(Scope::new());
        Self {
            resolver,
            scopes,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Bind a name for the rest of the evaluation (used by `let`)
    pub fn bind_global(&mut self, name: &str, value: Value) {
        if let Some(root) = self.scopes.first_mut() {
            root.insert(name.to_lowercase(), value);
        }
    }

    /// Bind a name in the innermost scope
    pub fn bind(&mut self, name: &str, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_lowercase(), value);
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Look up a name bound inside the expression
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        let key = name.to_lowercase();
        self.scopes.iter().rev().find_map(|scope| scope.get(&key))
    }

    /// Resolve an identifier: expression bindings first, then the host
    pub fn resolve(&self, name: &str) -> EvalResult<Value> {
        if let Some(value) = self.lookup(name) {
            return Ok(value.clone());
        }
        self.resolver
            .resolve(name)?
            .ok_or_else(|| EvalError::unresolved(name))
    }

    pub fn to_number(&self, value: &Value) -> Option<f64> {
        self.resolver.to_number(value)
    }

    /// Enter a nested evaluation level
    pub fn enter(&mut self) -> EvalResult<()> {
        if self.depth >= self.max_depth {
            return Err(EvalError::RecursionLimit);
        }
        self.depth += 1;
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
