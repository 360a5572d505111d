//! Expression parser using Winnow
//!
//! Recursive descent with precedence climbing. Keywords and function names
//! are case-insensitive; field references are either plain identifiers or
//! bracketed (`[Body weight?]`).

mod combinators;
mod expression;

use crate::ast::Expr;
use blackboard_diagnostics::{
    BB0001, BB0002, BB0003, BB0004, BB0005, BB0006, BB0007, BB0008, BlackboardError, ErrorCode, Result,
    SourceLocation, Span,
};
use combinators::{Input, NESTING_LABEL, ws};
use winnow::error::{ContextError, ErrMode, StrContext, StrContextValue};

/// Parse an expression, requiring the whole input to be consumed
pub fn parse_expression(source: &str) -> Result<Expr> {
    let mut input: Input<'_> = source;

    let parsed = expression::expression(&mut input).and_then(|expr| {
        ws(&mut input)?;
        Ok(expr)
    });

    match parsed {
        Ok(expr) if input.is_empty() => Ok(expr),
        Ok(_) => {
            let offset = source.len() - input.len();
            let next = input.chars().next().unwrap_or_default();
            Err(parse_error(source, offset, BB0007, format!("Unexpected '{}'", next)))
        }
        Err(err) => {
            let offset = source.len() - input.len();
            let context = match err {
                ErrMode::Backtrack(e) | ErrMode::Cut(e) => e,
                ErrMode::Incomplete(_) => ContextError::new(),
            };
            let at_end = input.trim_start().is_empty();
            let (code, message) = describe(&context, at_end);
            Err(parse_error(source, offset, code, message))
        }
    }
}

fn parse_error(source: &str, offset: usize, code: ErrorCode, message: String) -> BlackboardError {
    let location = SourceLocation::from_span(Span::point(offset), source);
    BlackboardError::parse_at(
        code,
        format!("Parse error at {}: {}", location, message),
        source,
        location,
    )
}

fn describe(context: &ContextError, at_end: bool) -> (ErrorCode, String) {
    if context
        .context()
        .any(|ctx| matches!(ctx, StrContext::Label(label) if *label == NESTING_LABEL))
    {
        return (
            BB0008,
            format!("nesting deeper than {} levels", expression::MAX_NESTING),
        );
    }

    let expectation = context.context().find_map(|ctx| match ctx {
        StrContext::Expected(value) => Some(value),
        _ => None,
    });

    let code = match expectation {
        Some(StrContextValue::Description("closing quote")) => BB0003,
        Some(StrContextValue::Description("number")) => BB0004,
        Some(StrContextValue::CharLiteral(_)) => BB0005,
        _ if at_end => BB0002,
        Some(StrContextValue::Description("expression")) => BB0006,
        _ => BB0001,
    };

    let message = match expectation {
        Some(value) => format!("expected {}", value),
        None => code.info().description.to_string(),
    };

    (code, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOp;
    use crate::value::Value;

    #[test]
    fn test_parse_simple_sum() {
        let expr = parse_expression("a + 2").unwrap();
        assert_eq!(
            expr,
            Expr::binary(Expr::identifier("a"), BinaryOp::Add, Expr::Literal(Value::Number(2.0)))
        );
    }

    #[test]
    fn test_trailing_input_is_reported() {
        let err = parse_expression("a b").unwrap_err();
        assert_eq!(err.code(), BB0007);
        assert_eq!(err.location().map(|l| l.column), Some(3));
    }

    #[test]
    fn test_unbalanced_parenthesis() {
        let err = parse_expression("(a + 1").unwrap_err();
        assert_eq!(err.code(), BB0005);
    }

    #[test]
    fn test_empty_expression() {
        let err = parse_expression("   ").unwrap_err();
        assert_eq!(err.code(), BB0002);
    }

    #[test]
    fn test_nesting_at_limit_is_accepted() {
        let depth = expression::MAX_NESTING;
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(parse_expression(&source).unwrap(), Expr::Literal(Value::Number(1.0)));
    }

    #[test]
    fn test_nesting_past_limit_is_rejected() {
        let depth = expression::MAX_NESTING + 1;
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(parse_expression(&source).unwrap_err().code(), BB0008);
    }

    #[test]
    fn test_unterminated_string() {
        let err = parse_expression("'abc").unwrap_err();
        assert_eq!(err.code(), BB0003);
    }
}
