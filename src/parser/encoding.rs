// Parser for channel binding expressions

use super::ast::{Binding, EncodingExpr};
use super::lexer::{identifier, string_literal, ws};
use crate::registry::Slot;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{eof, map_res, opt},
    multi::separated_list1,
    sequence::{delimited, separated_pair, terminated},
    IResult,
};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EncodingParseError {
    #[error("invalid encoding expression near '{0}'")]
    Syntax(String),
    #[error("channel '{0}' is bound more than once")]
    DuplicateChannel(Slot),
}

fn slot_key(input: &str) -> IResult<&str, Slot> {
    map_res(
        alt((
            tag("symbol"),
            tag("colour"),
            tag("color"),
            tag("size"),
            tag("x"),
            tag("y"),
            tag("z"),
        )),
        str::parse::<Slot>,
    )(input)
}

/// Parse a single binding
/// Format: key: column  or  key: "quoted column"
pub fn parse_binding(input: &str) -> IResult<&str, Binding> {
    let (input, (slot, column)) = separated_pair(
        ws(slot_key),
        char(':'),
        ws(alt((string_literal, identifier))),
    )(input)?;
    Ok((input, Binding { slot, column }))
}

fn parse_binding_list(input: &str) -> IResult<&str, Vec<Binding>> {
    terminated(
        separated_list1(char(','), parse_binding),
        opt(ws(char(','))),
    )(input)
}

/// Parse a complete expression, optionally wrapped in `aes(...)`
pub fn parse_encoding_expr(input: &str) -> IResult<&str, EncodingExpr> {
    let (input, bindings) = alt((
        delimited(
            ws(tag("aes")),
            delimited(char('('), parse_binding_list, char(')')),
            ws(eof),
        ),
        terminated(parse_binding_list, ws(eof)),
    ))(input)?;
    Ok((input, EncodingExpr { bindings }))
}

/// Parse an expression and check each channel is bound at most once.
pub fn parse_encoding(input: &str) -> Result<EncodingExpr, EncodingParseError> {
    let expr = match parse_encoding_expr(input) {
        Ok((_, expr)) => expr,
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            return Err(EncodingParseError::Syntax(e.input.trim().to_string()));
        }
        Err(nom::Err::Incomplete(_)) => {
            return Err(EncodingParseError::Syntax(input.trim().to_string()));
        }
    };

    for (i, binding) in expr.bindings.iter().enumerate() {
        if expr.bindings[..i].iter().any(|b| b.slot == binding.slot) {
            return Err(EncodingParseError::DuplicateChannel(binding.slot));
        }
    }
    Ok(expr)
}
