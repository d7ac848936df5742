//! ThalamusDB: bounded-error SQL execution over semantic predicates
//! evaluated by a large language model.
//!
//! A query is parsed, its semantic predicates (`NLfilter`, `NLjoin`) are
//! pushed against scratch tables, the relational engine enumerates every
//! default-bit combination for the undecided predicates, and the
//! execution loop narrows the result bounds batch by batch until an
//! error threshold or a cost budget is met (see `SPEC_FULL.md`).

pub mod bounds;
pub mod catalog;
pub mod config;
pub mod counters;
pub mod engine;
pub mod engine_db;
pub mod errors;
pub mod llm;
pub mod operators;
pub mod query;
pub mod rewriter;

pub use bounds::Bounds;
pub use catalog::Catalog;
pub use config::{Constraints, EngineConfig};
pub use counters::TdbCounters;
pub use engine::{ExecutionEngine, TdbResult};
pub use engine_db::{EngineError, RelationalEngine, SqliteEngine, Value};
pub use errors::TdbError;
pub use llm::{LlmClient, LlmConfig};
pub use query::{parse_and_qualify, Query};
