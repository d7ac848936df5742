//! The best-guess result and per-round bounds snapshot returned by the
//! execution loop (spec.md §4.5).

use crate::bounds::{AggregateBounds, Bounds, RetrievalBounds};
use crate::counters::TdbCounters;
use crate::engine_db::Value;

/// The best-guess result row(s) plus the tightened bounds and cost
/// counters that produced them.
#[derive(Debug, Clone)]
pub struct TdbResult {
    pub bounds: Bounds,
    pub counters: TdbCounters,
    pub error: f64,
    pub elapsed_secs: f64,
}

impl TdbResult {
    /// The best-guess result: the all-defaults-1 aggregate row, or the
    /// retrieval union (spec.md §4.5).
    pub fn best_guess_rows(&self) -> Vec<Vec<Value>> {
        match &self.bounds {
            Bounds::Aggregate(AggregateBounds { best_guess, .. }) => {
                best_guess.clone().into_iter().collect()
            }
            Bounds::Retrieval(RetrievalBounds { union, .. }) => union.clone(),
        }
    }

    pub fn columns(&self) -> &[String] {
        match &self.bounds {
            Bounds::Aggregate(a) => &a.columns,
            Bounds::Retrieval(r) => &r.columns,
        }
    }
}
