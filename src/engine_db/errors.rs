//! Errors surfaced by the relational engine adapter.
//!
//! A rewritten query that the underlying engine rejects is, per spec.md
//! §7, always a rewriter bug — so [`EngineError::RejectedQuery`] is
//! treated as fatal by the caller, never retried.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("underlying engine rejected query: {sql}\ncaused by: {source}")]
    RejectedQuery {
        sql: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("no such table: {0}")]
    UnknownTable(String),

    #[error("connection error: {0}")]
    Connection(#[source] sqlx::Error),
}
