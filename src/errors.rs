//! Top-level error aggregation at the engine boundary (spec.md §7).
//! `BudgetExhausted` is deliberately not a variant here: it is a normal
//! termination, not a failure, so the execution loop returns `Ok` with
//! the best-available bounds and counters instead of an `Err`.

use thiserror::Error;

use crate::config::ConfigError;
use crate::engine_db::EngineError;
use crate::llm::LlmError;
use crate::operators::OperatorError;
use crate::query::QueryError;

#[derive(Error, Debug)]
pub enum TdbError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Operator(#[from] OperatorError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
