//! Semantic operators: per-predicate evaluation state holding a
//! scratch table of pending/decided rows (spec.md §3, §4.2).

pub mod errors;
pub mod join;
pub mod unary_filter;

use async_trait::async_trait;

pub use errors::OperatorError;
pub use join::JoinOperator;
pub use unary_filter::UnaryFilterOperator;

use crate::counters::TdbCounters;
use crate::engine_db::RelationalEngine;
use crate::llm::LlmClient;
use crate::query::Predicate;

/// Outcome of one `execute(n, order)` round, used by the engine to
/// detect a non-progressing iteration (spec.md §7).
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecuteOutcome {
    pub rows_decided: usize,
}

/// Shared contract of `UnaryFilter` and `Join` (spec.md §4.2).
#[async_trait]
pub trait Operator: Send + Sync {
    async fn prepare(&mut self, engine: &dyn RelationalEngine) -> Result<(), OperatorError>;

    async fn execute(
        &mut self,
        batch_size: u32,
        order_hint: Option<(String, bool)>,
        engine: &dyn RelationalEngine,
        llm: &dyn LlmClient,
    ) -> Result<ExecuteOutcome, OperatorError>;

    /// The scratch table's unique name (spec.md §3).
    fn scratch_table(&self) -> &str;

    fn predicate(&self) -> &Predicate;

    fn counters(&self) -> &TdbCounters;
}

/// Number of retry attempts on a transient LLM failure before a row is
/// left `Unknown` for this round (SPEC_FULL.md §9).
pub(crate) const LLM_RETRIES: u32 = 3;

pub(crate) fn base_col(column: &str) -> String {
    format!("base_{column}")
}
