//! Token-level parsers shared by the expression grammar
//!
//! All helpers have concrete error types so they compose with `?` inside the
//! recursive descent functions.

use winnow::ascii::digit1;
use winnow::combinator::{cut_err, fail, opt, preceded};
use winnow::error::{ContextError, ErrMode, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_till, take_while};

pub(crate) type Input<'a> = &'a str;
pub(crate) type PResult<T> = Result<T, ErrMode<ContextError>>;

pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Skip whitespace
pub(crate) fn ws(input: &mut Input<'_>) -> PResult<()> {
    take_while(0.., char::is_whitespace).void().parse_next(input)
}

/// Fail without recovery, recording what was expected at this position
pub(crate) fn expected<T>(input: &mut Input<'_>, what: &'static str) -> PResult<T> {
    cut_err(fail)
        .context(StrContext::Expected(StrContextValue::Description(what)))
        .parse_next(input)
}

pub(crate) const NESTING_LABEL: &str = "nesting";

/// Fail without recovery because the expression nests too deeply
pub(crate) fn too_deep<T>(input: &mut Input<'_>) -> PResult<T> {
    cut_err(fail).context(StrContext::Label(NESTING_LABEL)).parse_next(input)
}

/// Consume a closing delimiter or fail without recovery
pub(crate) fn close(input: &mut Input<'_>, delimiter: char) -> PResult<()> {
    ws(input)?;
    cut_err(delimiter)
        .context(StrContext::Expected(StrContextValue::CharLiteral(delimiter)))
        .void()
        .parse_next(input)
}

/// Check whether `token` is next, without consuming it
///
/// Word tokens (`and`, `not`, ...) match case-insensitively and must not be
/// followed by an identifier character.
pub(crate) fn peek_token(input: &str, token: &str) -> bool {
    let Some(head) = input.get(..token.len()) else {
        return false;
    };
    if token.chars().all(is_ident_char) {
        head.eq_ignore_ascii_case(token) && !input[token.len()..].starts_with(is_ident_char)
    } else {
        head == token
    }
}

/// Consume `token` if it is next (after whitespace)
pub(crate) fn token(input: &mut Input<'_>, token: &str) -> PResult<bool> {
    ws(input)?;
    if peek_token(input, token) {
        *input = &input[token.len()..];
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Consume the first operator of `table` found next in the input
pub(crate) fn operator<T: Copy>(input: &mut Input<'_>, table: &[(&str, T)]) -> PResult<Option<T>> {
    ws(input)?;
    for (symbol, op) in table {
        if peek_token(input, symbol) {
            *input = &input[symbol.len()..];
            return Ok(Some(*op));
        }
    }
    Ok(None)
}

pub(crate) fn identifier_token<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    (one_of(is_ident_start), take_while(0.., is_ident_char))
        .take()
        .parse_next(input)
}

fn bracket_body<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    preceded('[', take_till(0.., ']')).parse_next(input)
}

/// `[any text]`, returning the trimmed text
pub(crate) fn bracket_identifier<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    let name = bracket_body(input)?.trim();
    close(input, ']')?;
    if name.is_empty() {
        return expected(input, "identifier");
    }
    Ok(name)
}

fn number_text<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    (
        digit1,
        opt(('.', digit1)),
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
    )
        .take()
        .parse_next(input)
}

pub(crate) fn number_literal(input: &mut Input<'_>) -> PResult<f64> {
    let text = number_text(input)?;
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => expected(input, "number"),
    }
}

fn string_char(input: &mut Input<'_>) -> PResult<char> {
    cut_err(any)
        .context(StrContext::Expected(StrContextValue::Description("closing quote")))
        .parse_next(input)
}

/// Single-quoted string with backslash escapes
pub(crate) fn string_literal(input: &mut Input<'_>) -> PResult<String> {
    if !input.starts_with('\'') {
        return expected(input, "string");
    }
    *input = &input[1..];

    let mut text = String::new();
    loop {
        match string_char(input)? {
            '\'' => break,
            '\\' => text.push(match string_char(input)? {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                other => other,
            }),
            other => text.push(other),
        }
    }
    Ok(text)
}
