//! Numeric functions and conditional helpers
//!
//! Implements: abs, ceiling, floor, round, truncate, sign, sqrt, pow, exp,
//! log, log10, min, max, if, in
//!
//! Null arguments propagate to a null result.

use super::arithmetic::operand;
use super::comparison::equals;
use super::logical::truthy;
use crate::ast::Expr;
use crate::context::EvaluationContext;
use crate::engine::Engine;
use crate::error::EvalResult;
use crate::registry::{FunctionDefinition, FunctionRegistry};
use crate::value::Value;

pub(crate) fn register(registry: &mut FunctionRegistry) {
    unary(registry, "abs", f64::abs);
    unary(registry, "ceiling", f64::ceil);
    unary(registry, "floor", f64::floor);
    unary(registry, "truncate", f64::trunc);
    unary(registry, "sqrt", f64::sqrt);
    unary(registry, "exp", f64::exp);
    unary(registry, "log10", f64::log10);
    unary(registry, "sign", |n| if n == 0.0 { 0.0 } else { n.signum() });

    registry.register(FunctionDefinition::eager("pow", 2, Some(2), |args, _ctx| {
        numeric2("pow", &args[0], &args[1], f64::powf)
    }));
    registry.register(FunctionDefinition::eager("round", 1, Some(2), round));
    registry.register(FunctionDefinition::eager("log", 1, Some(2), |args, _ctx| match args.get(1) {
        Some(base) => numeric2("log", &args[0], base, f64::log),
        None => numeric1("log", &args[0], f64::ln),
    }));
    registry.register(FunctionDefinition::eager("min", 1, None, |args, _ctx| {
        fold("min", args, f64::min)
    }));
    registry.register(FunctionDefinition::eager("max", 1, None, |args, _ctx| {
        fold("max", args, f64::max)
    }));
    registry.register(FunctionDefinition::lazy("if", 3, Some(3), if_then_else));
    registry.register(FunctionDefinition::eager("in", 1, None, |args, _ctx| {
        Ok(Value::Boolean(args[1..].iter().any(|candidate| equals(&args[0], candidate))))
    }));
}

fn unary(registry: &mut FunctionRegistry, name: &'static str, f: fn(f64) -> f64) {
    registry.register(FunctionDefinition::eager(name, 1, Some(1), move |args, _ctx| {
        numeric1(name, &args[0], f)
    }));
}

fn numeric1(name: &str, value: &Value, f: impl Fn(f64) -> f64) -> EvalResult<Value> {
    Ok(operand(name, value)?.map_or(Value::Null, |n| Value::Number(f(n))))
}

fn numeric2(name: &str, a: &Value, b: &Value, f: impl Fn(f64, f64) -> f64) -> EvalResult<Value> {
    match (operand(name, a)?, operand(name, b)?) {
        (Some(a), Some(b)) => Ok(Value::Number(f(a, b))),
        _ => Ok(Value::Null),
    }
}

fn fold(name: &str, args: &[Value], f: impl Fn(f64, f64) -> f64) -> EvalResult<Value> {
    let mut acc: Option<f64> = None;
    for value in Value::flatten(args) {
        let Some(n) = operand(name, &value)? else {
            return Ok(Value::Null);
        };
        acc = Some(acc.map_or(n, |a| f(a, n)));
    }
    Ok(acc.map_or(Value::Null, Value::Number))
}

/// Round half away from zero to the given number of digits
fn round(args: &[Value], _ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
    let digits = match args.get(1) {
        Some(digits) => match operand("round", digits)? {
            Some(d) => d.trunc() as i32,
            None => return Ok(Value::Null),
        },
        None => 0,
    };
    let factor = 10f64.powi(digits);
    numeric1("round", &args[0], |n| (n * factor).round() / factor)
}

fn if_then_else(engine: &Engine, args: &[Expr], ctx: &mut EvaluationContext<'_>) -> EvalResult<Value> {
    if truthy(&engine.evaluate(&args[0], ctx)?)? {
        engine.evaluate(&args[1], ctx)
    } else {
        engine.evaluate(&args[2], ctx)
    }
}
