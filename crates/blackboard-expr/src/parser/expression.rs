//! Expression grammar using recursive descent with precedence climbing

use super::combinators::{
    Input, PResult, bracket_identifier, close, expected, identifier_token, is_ident_start,
    number_literal, operator, peek_token, string_literal, token, too_deep, ws,
};
use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::value::Value;

const EQUALITY_OPERATORS: &[(&str, BinaryOp)] = &[
    ("==", BinaryOp::Equal),
    ("!=", BinaryOp::NotEqual),
    ("<>", BinaryOp::NotEqual),
    ("=", BinaryOp::Equal),
];

const RELATIONAL_OPERATORS: &[(&str, BinaryOp)] = &[
    ("<=", BinaryOp::LessOrEqual),
    (">=", BinaryOp::GreaterOrEqual),
    ("<", BinaryOp::Less),
    (">", BinaryOp::Greater),
];

const ADDITIVE_OPERATORS: &[(&str, BinaryOp)] = &[("+", BinaryOp::Add), ("-", BinaryOp::Subtract)];

const MULTIPLICATIVE_OPERATORS: &[(&str, BinaryOp)] = &[
    ("*", BinaryOp::Multiply),
    ("/", BinaryOp::Divide),
    ("%", BinaryOp::Modulo),
];

/// Deepest nesting of parentheses, call arguments, unary operators and
/// conditional branches accepted by the parser
pub(crate) const MAX_NESTING: usize = 64;

/// Parse a full expression (entry point)
pub(crate) fn expression(input: &mut Input<'_>) -> PResult<Expr> {
    nested_expression(input, 0)
}

fn nested_expression(input: &mut Input<'_>, depth: usize) -> PResult<Expr> {
    ws(input)?;
    conditional_expression(input, depth)
}

fn deeper(input: &mut Input<'_>, depth: usize) -> PResult<usize> {
    if depth >= MAX_NESTING {
        return too_deep(input);
    }
    Ok(depth + 1)
}

/// `condition ? then : otherwise`, right-associative
fn conditional_expression(input: &mut Input<'_>, depth: usize) -> PResult<Expr> {
    let condition = or_expression(input, depth)?;

    if token(input, "?")? {
        let depth = deeper(input, depth)?;
        let then = conditional_expression(input, depth)?;
        close(input, ':')?;
        let otherwise = conditional_expression(input, depth)?;
        return Ok(Expr::Conditional {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        });
    }

    Ok(condition)
}

fn or_expression(input: &mut Input<'_>, depth: usize) -> PResult<Expr> {
    let mut left = and_expression(input, depth)?;

    while token(input, "or")? || token(input, "||")? {
        let right = and_expression(input, depth)?;
        left = Expr::binary(left, BinaryOp::Or, right);
    }

    Ok(left)
}

fn and_expression(input: &mut Input<'_>, depth: usize) -> PResult<Expr> {
    let mut left = equality_expression(input, depth)?;

    while token(input, "and")? || token(input, "&&")? {
        let right = equality_expression(input, depth)?;
        left = Expr::binary(left, BinaryOp::And, right);
    }

    Ok(left)
}

fn equality_expression(input: &mut Input<'_>, depth: usize) -> PResult<Expr> {
    let mut left = relational_expression(input, depth)?;

    while let Some(op) = operator(input, EQUALITY_OPERATORS)? {
        let right = relational_expression(input, depth)?;
        left = Expr::binary(left, op, right);
    }

    Ok(left)
}

fn relational_expression(input: &mut Input<'_>, depth: usize) -> PResult<Expr> {
    let mut left = additive_expression(input, depth)?;

    loop {
        ws(input)?;
        // `<>` belongs to the equality level
        if peek_token(input, "<>") {
            break;
        }
        match operator(input, RELATIONAL_OPERATORS)? {
            Some(op) => {
                let right = additive_expression(input, depth)?;
                left = Expr::binary(left, op, right);
            }
            None => break,
        }
    }

    Ok(left)
}

fn additive_expression(input: &mut Input<'_>, depth: usize) -> PResult<Expr> {
    let mut left = multiplicative_expression(input, depth)?;

    while let Some(op) = operator(input, ADDITIVE_OPERATORS)? {
        let right = multiplicative_expression(input, depth)?;
        left = Expr::binary(left, op, right);
    }

    Ok(left)
}

fn multiplicative_expression(input: &mut Input<'_>, depth: usize) -> PResult<Expr> {
    let mut left = unary_expression(input, depth)?;

    while let Some(op) = operator(input, MULTIPLICATIVE_OPERATORS)? {
        let right = unary_expression(input, depth)?;
        left = Expr::binary(left, op, right);
    }

    Ok(left)
}

fn unary_expression(input: &mut Input<'_>, depth: usize) -> PResult<Expr> {
    ws(input)?;

    if input.starts_with('!') && !input.starts_with("!=") {
        *input = &input[1..];
        let depth = deeper(input, depth)?;
        return Ok(Expr::unary(UnaryOp::Not, unary_expression(input, depth)?));
    }
    if token(input, "not")? {
        let depth = deeper(input, depth)?;
        return Ok(Expr::unary(UnaryOp::Not, unary_expression(input, depth)?));
    }
    if input.starts_with('-') {
        *input = &input[1..];
        let depth = deeper(input, depth)?;
        return Ok(match unary_expression(input, depth)? {
            Expr::Literal(Value::Number(n)) => Expr::Literal(Value::Number(-n)),
            operand => Expr::unary(UnaryOp::Negate, operand),
        });
    }

    primary_expression(input, depth)
}

fn primary_expression(input: &mut Input<'_>, depth: usize) -> PResult<Expr> {
    ws(input)?;

    match input.chars().next() {
        Some('(') => {
            *input = &input[1..];
            let depth = deeper(input, depth)?;
            let inner = nested_expression(input, depth)?;
            close(input, ')')?;
            Ok(inner)
        }
        Some('\'') => string_literal(input).map(|s| Expr::Literal(Value::String(s))),
        Some('[') => bracket_identifier(input).map(Expr::identifier),
        Some(c) if c.is_ascii_digit() => number_literal(input).map(|n| Expr::Literal(Value::Number(n))),
        Some(c) if is_ident_start(c) => identifier_or_call(input, depth),
        _ => expected(input, "expression"),
    }
}

fn identifier_or_call(input: &mut Input<'_>, depth: usize) -> PResult<Expr> {
    let name = identifier_token(input)?;

    ws(input)?;
    if input.starts_with('(') {
        *input = &input[1..];
        let depth = deeper(input, depth)?;
        let args = call_arguments(input, depth)?;
        return Ok(Expr::call(name, args));
    }

    let literal = if name.eq_ignore_ascii_case("true") {
        Some(Value::Boolean(true))
    } else if name.eq_ignore_ascii_case("false") {
        Some(Value::Boolean(false))
    } else if name.eq_ignore_ascii_case("null") {
        Some(Value::Null)
    } else {
        None
    };

    Ok(literal.map_or_else(|| Expr::identifier(name), Expr::Literal))
}

/// Arguments after the opening parenthesis, including the closing one
fn call_arguments(input: &mut Input<'_>, depth: usize) -> PResult<Vec<Expr>> {
    let mut args = Vec::new();

    ws(input)?;
    if input.starts_with(')') {
        *input = &input[1..];
        return Ok(args);
    }

    loop {
        args.push(nested_expression(input, depth)?);
        if !token(input, ",")? {
            break;
        }
    }
    close(input, ')')?;

    Ok(args)
}
