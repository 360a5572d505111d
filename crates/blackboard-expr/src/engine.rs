//! Expression evaluation engine
//!
//! The [`Engine`] owns the function registry and a parse cache keyed by
//! expression text. It is `Send + Sync` and can be shared between data sets.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::context::{EvaluationContext, Resolver};
use crate::error::{EvalError, EvalResult};
use crate::operators::{arithmetic, comparison, logical};
use crate::parser::parse_expression;
use crate::registry::{FunctionImpl, FunctionRegistry};
use crate::value::Value;
use blackboard_diagnostics::Result;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// The expression evaluation engine
pub struct Engine {
    registry: FunctionRegistry,
    cache: Mutex<HashMap<String, Arc<Expr>>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create a new engine with the built-in functions
    pub fn new() -> Self {
        Self::with_registry(FunctionRegistry::with_standard_functions())
    }

    /// Create an engine with a custom registry
    pub fn with_registry(registry: FunctionRegistry) -> Self {
        Self {
            registry,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.registry
    }

    /// Parse an expression, reusing a cached tree for identical text
    pub fn parse(&self, source: &str) -> Result<Arc<Expr>> {
        if let Some(expr) = self.cache.lock().get(source) {
            return Ok(Arc::clone(expr));
        }

        let expr = Arc::new(parse_expression(source)?);
        self.cache.lock().insert(source.to_string(), Arc::clone(&expr));
        log::trace!("cached expression `{}`", source);
        Ok(expr)
    }

    /// Parse and evaluate an expression against a resolver
    pub fn evaluate_str(&self, source: &str, resolver: &dyn Resolver) -> Result<Value> {
        let expr = self.parse(source)?;
        let mut ctx = EvaluationContext::new(resolver);
        Ok(self.evaluate(&expr, &mut ctx)?)
    }

    /// Evaluate an expression tree
    pub fn evaluate(&self, expr: &Expr, ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
        ctx.enter()?;
        let result = self.dispatch(expr, ctx);
        ctx.leave();
        result
    }

    fn dispatch(&self, expr: &Expr, ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Identifier(name) => ctx.resolve(name),
            Expr::Unary { op, operand } => {
                let value = self.evaluate(operand, ctx)?;
                match op {
                    UnaryOp::Not => logical::not(&value),
                    UnaryOp::Negate => arithmetic::negate(&value),
                }
            }
            Expr::Binary { left, op: BinaryOp::And, right } => {
                if !logical::truthy(&self.evaluate(left, ctx)?)? {
                    return Ok(Value::Boolean(false));
                }
                Ok(Value::Boolean(logical::truthy(&self.evaluate(right, ctx)?)?))
            }
            Expr::Binary { left, op: BinaryOp::Or, right } => {
                if logical::truthy(&self.evaluate(left, ctx)?)? {
                    return Ok(Value::Boolean(true));
                }
                Ok(Value::Boolean(logical::truthy(&self.evaluate(right, ctx)?)?))
            }
            Expr::Binary { left, op, right } => {
                let left = self.evaluate(left, ctx)?;
                let right = self.evaluate(right, ctx)?;
                match op {
                    BinaryOp::Equal => Ok(Value::Boolean(comparison::equals(&left, &right))),
                    BinaryOp::NotEqual => Ok(Value::Boolean(!comparison::equals(&left, &right))),
                    BinaryOp::Less
                    | BinaryOp::LessOrEqual
                    | BinaryOp::Greater
                    | BinaryOp::GreaterOrEqual => comparison::compare(*op, &left, &right),
                    _ => arithmetic::binary(*op, &left, &right),
                }
            }
            Expr::Conditional { condition, then, otherwise } => {
                if logical::truthy(&self.evaluate(condition, ctx)?)? {
                    self.evaluate(then, ctx)
                } else {
                    self.evaluate(otherwise, ctx)
                }
            }
            Expr::Call { name, args } => self.call(name, args, ctx),
        }
    }

    /// Invoke a registered function
    pub fn call(&self, name: &str, args: &[Expr], ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
        let definition = self
            .registry
            .get(name)
            .ok_or_else(|| EvalError::undefined_function(name))?;
        definition.check_arity(args.len())?;

        match &definition.implementation {
            FunctionImpl::Lazy(f) => f(self, args, ctx),
            FunctionImpl::Eager(f) => {
                let values = args
                    .iter()
                    .map(|arg| self.evaluate(arg, ctx))
                    .collect::<EvalResult<Vec<_>>>()?;
                f(&values, ctx)
            }
        }
    }
}
