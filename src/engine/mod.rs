//! The execution loop driver: prepare operators, repeatedly advance
//! them, recompute bounds, terminate on constraints (spec.md §4.5),
//! grounded on `tdb/execution/engine.py`'s `ExecutionEngine.run`.

pub mod result;

use std::time::Instant;

use crate::bounds::{self, Bounds};
use crate::config::{Constraints, EngineConfig};
use crate::counters::TdbCounters;
use crate::engine_db::RelationalEngine;
use crate::errors::TdbError;
use crate::llm::LlmClient;
use crate::operators::{JoinOperator, Operator, UnaryFilterOperator};
use crate::query::{Predicate, Query};

pub use result::TdbResult;

pub struct ExecutionEngine<'a> {
    engine: &'a dyn RelationalEngine,
    llm: &'a dyn LlmClient,
    config: EngineConfig,
    constraints: Constraints,
}

impl<'a> ExecutionEngine<'a> {
    pub fn new(
        engine: &'a dyn RelationalEngine,
        llm: &'a dyn LlmClient,
        config: EngineConfig,
        constraints: Constraints,
    ) -> Self {
        Self {
            engine,
            llm,
            config,
            constraints,
        }
    }

    fn build_operators(query: &Query) -> Vec<Box<dyn Operator>> {
        query
            .predicates
            .iter()
            .map(|p| -> Box<dyn Operator> {
                match p {
                    Predicate::Unary { .. } => Box::new(UnaryFilterOperator::new(p.clone(), query)),
                    Predicate::Join { .. } => Box::new(JoinOperator::new(p.clone(), query)),
                }
            })
            .collect()
    }

    /// Runs the bounded-evaluation loop for one already-parsed query
    /// (spec.md §4.5):
    ///
    /// ```text
    /// prepare all operators
    /// loop:
    ///   for each operator: execute(batch_size, order_hint)
    ///   recompute bounds and error
    ///   update counters
    ///   if constraints.terminate(counters, elapsed, error): break
    /// return (best_guess_result, counters)
    /// ```
    pub async fn run(&self, query: &Query) -> Result<TdbResult, TdbError> {
        let start = Instant::now();
        let mut operators = Self::build_operators(query);

        for op in operators.iter_mut() {
            op.prepare(self.engine).await?;
        }

        loop {
            let mut progressed = false;
            for op in operators.iter_mut() {
                let outcome = op
                    .execute(self.config.batch_size as u32, None, self.engine, self.llm)
                    .await?;
                if outcome.rows_decided > 0 {
                    progressed = true;
                }
            }

            let counters: TdbCounters = operators.iter().map(|op| op.counters().clone()).sum();
            let bounds: Bounds = bounds::compute(query, &operators, self.engine).await?;
            let error = bounds.error();
            let elapsed_secs = start.elapsed().as_secs_f64();

            let should_stop = self.constraints.terminate(&counters, elapsed_secs, error)
                || (!progressed && !operators.is_empty());

            if should_stop {
                return Ok(TdbResult {
                    bounds,
                    counters,
                    error,
                    elapsed_secs,
                });
            }
        }
    }
}
