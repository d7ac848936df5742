//! `SELECT` parser, in the teacher codebase's `open_cypher_parser` style:
//! a tokenizing `common` module, an expression grammar, and a top-level
//! statement grammar, all built on `nom` 8's `Parser` trait.

pub mod common;
pub mod expression;
pub mod select;

use crate::query::ast::RawSelect;
use crate::query::errors::ParseError;

/// Parses one `SELECT` statement. Anything left unconsumed (including a
/// second statement) is reported as malformed input — the engine only
/// ever accepts one query per call (spec.md §3, §6).
pub fn parse_query(sql: &str) -> Result<RawSelect, ParseError> {
    match select::parse_select(sql) {
        Ok((rest, raw)) if rest.trim().is_empty() => Ok(raw),
        Ok((rest, _)) => Err(ParseError::Malformed(format!(
            "unexpected trailing input: {rest}"
        ))),
        Err(err) => Err(ParseError::Malformed(err.to_string())),
    }
}
