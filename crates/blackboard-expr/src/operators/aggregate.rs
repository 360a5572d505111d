//! Built-in aggregate and binding functions
//!
//! Implements: isnull, count, average, sum, let, sequence

use crate::ast::Expr;
use crate::context::EvaluationContext;
use crate::engine::Engine;
use crate::error::{EvalError, EvalResult};
use crate::registry::{FunctionDefinition, FunctionRegistry};
use crate::value::Value;

/// Name bound to each element while a `sum` projection runs
pub const PROJECTION_VALUE: &str = "value";

pub(crate) fn register(registry: &mut FunctionRegistry) {
    registry.register(FunctionDefinition::eager("isnull", 1, None, isnull));
    registry.register(FunctionDefinition::eager("count", 0, None, count));
    registry.register(FunctionDefinition::eager("average", 0, None, average));
    registry.register(FunctionDefinition::lazy("sum", 1, Some(2), sum));
    registry.register(FunctionDefinition::lazy("let", 2, Some(2), let_binding));
    registry.register(FunctionDefinition::eager("sequence", 1, None, sequence));
}

/// True if any argument is null
fn isnull(args: &[Value], _ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
    Ok(Value::Boolean(args.iter().any(Value::is_null)))
}

/// Number of leaf values after flattening nested sequences
fn count(args: &[Value], _ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
    Ok(Value::Number(Value::flatten(args).len() as f64))
}

/// Mean of the convertible leaf values, null when there are none
fn average(args: &[Value], ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
    let numbers: Vec<f64> = Value::flatten(args)
        .iter()
        .filter_map(|value| ctx.to_number(value))
        .collect();

    if numbers.is_empty() {
        return Ok(Value::Null);
    }
    Ok(Value::Number(numbers.iter().fold(0.0, |sum, n| sum + n) / numbers.len() as f64))
}

/// `sum(set[, projection])`, zero for an empty set
fn sum(engine: &Engine, args: &[Expr], ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
    let items = match engine.evaluate(&args[0], ctx)? {
        Value::Sequence(items) => items,
        Value::Null => Vec::new(),
        other => {
            return Err(EvalError::type_mismatch(
                "sum",
                format!("expected a sequence, found {}", other.type_name()),
            ));
        }
    };

    let projected = match args.get(1) {
        Some(projection) => {
            let mut projected = Vec::with_capacity(items.len());
            for item in items {
                ctx.push_scope();
                ctx.bind(PROJECTION_VALUE, item);
                let result = engine.evaluate(projection, ctx);
                ctx.pop_scope();
                projected.push(result?);
            }
            projected
        }
        None => items,
    };

    let total = projected
        .iter()
        .filter_map(|value| ctx.to_number(value))
        .fold(0.0, |sum, n| sum + n);
    Ok(Value::Number(total))
}

/// `let(name, expr)` binds the result for the rest of the evaluation
fn let_binding(engine: &Engine, args: &[Expr], ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
    let name = match &args[0] {
        Expr::Identifier(name) => name.clone(),
        other => match engine.evaluate(other, ctx)? {
            Value::String(name) if !name.trim().is_empty() => name,
            value => {
                return Err(EvalError::type_mismatch(
                    "let",
                    format!("variable name must be a string, found {}", value.type_name()),
                ));
            }
        },
    };

    let value = engine.evaluate(&args[1], ctx)?;
    ctx.bind_global(&name, value.clone());
    Ok(value)
}

/// Arguments are evaluated in order; the last one is the result
fn sequence(args: &[Value], _ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
    Ok(args.last().cloned().unwrap_or_default())
}
