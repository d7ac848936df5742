//! Operator-level errors (spec.md §4.2, §7). A scratch-table DDL
//! failure is fatal; an LLM classification failure is retried a bounded
//! number of times before the row is left `Unknown`.

use thiserror::Error;

use crate::engine_db::EngineError;
use crate::llm::LlmError;

#[derive(Error, Debug)]
pub enum OperatorError {
    #[error("failed to prepare scratch table: {0}")]
    ScratchTableSetup(#[source] EngineError),

    #[error("relational engine rejected operator query: {0}")]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}
