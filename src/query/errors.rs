//! Parse- and schema-time errors (spec.md §7).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("malformed SQL near: {0}")]
    Malformed(String),

    #[error("unsupported construct: {0}")]
    Unsupported(String),

    #[error("subqueries containing semantic predicates are not supported")]
    SemanticPredicateInSubquery,

    #[error("aggregate `{0}` is not supported; expected one of COUNT, SUM, MIN, MAX, AVG")]
    UnsupportedAggregate(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("ambiguous column `{column}`: present in aliases {aliases:?}")]
    AmbiguousColumn { column: String, aliases: Vec<String> },

    #[error("duplicate table alias: {0}")]
    DuplicateAlias(String),
}
