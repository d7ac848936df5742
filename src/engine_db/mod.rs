//! The underlying relational engine contract (spec.md §1, §6).
//!
//! ThalamusDB treats the relational engine as an external collaborator:
//! it must support `execute`, `columns`, `schema`, DDL passthrough,
//! temporary tables and `IN (SELECT …)` membership predicates. The
//! shipped implementation embeds SQLite via `sqlx`.

pub mod errors;
pub mod sqlite_engine;
pub mod value;

use async_trait::async_trait;
use std::collections::HashMap;

pub use errors::EngineError;
pub use sqlite_engine::SqliteEngine;
pub use value::{ColumnInfo, QueryResult, Value};

/// Contract required of any relational engine backing ThalamusDB.
#[async_trait]
pub trait RelationalEngine: Send + Sync {
    /// Run a `SELECT` (or any statement returning rows) and materialize
    /// the full result set.
    async fn execute(&self, sql: &str) -> Result<QueryResult, EngineError>;

    /// Run a statement with no result set: `CREATE TABLE`, `INSERT`,
    /// `UPDATE`, `ALTER TABLE`, or a CSV load.
    async fn execute_ddl(&self, sql: &str) -> Result<(), EngineError>;

    /// Declared columns of a base table, in schema order.
    async fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>, EngineError>;

    /// The full catalog: table name -> declared columns.
    async fn schema(&self) -> Result<HashMap<String, Vec<ColumnInfo>>, EngineError>;
}
