//! Evaluates all `2^k` default combinations and aggregates them into
//! sound lower/upper result bounds plus an error scalar (spec.md §4.4).

pub mod aggregate;
pub mod retrieval;

pub use aggregate::{AggregateBounds, CellBounds};
pub use retrieval::RetrievalBounds;

use crate::engine_db::{EngineError, QueryResult, RelationalEngine, Value};
use crate::operators::Operator;
use crate::query::ast::Expr;
use crate::query::Query;
use crate::rewriter;

#[derive(Debug, Clone)]
pub enum Bounds {
    Aggregate(AggregateBounds),
    Retrieval(RetrievalBounds),
}

impl Bounds {
    pub fn error(&self) -> f64 {
        match self {
            Bounds::Aggregate(a) => a.error,
            Bounds::Retrieval(r) => r.error,
        }
    }
}

fn replace_avg(items: &[Expr], replacement: &str) -> (Vec<Expr>, Vec<usize>) {
    let mut out = Vec::with_capacity(items.len());
    let mut positions = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        match item {
            Expr::Call { name, args } if name.eq_ignore_ascii_case("AVG") => {
                out.push(Expr::Call {
                    name: replacement.to_string(),
                    args: args.clone(),
                });
                positions.push(idx);
            }
            other => out.push(other.clone()),
        }
    }
    (out, positions)
}

async fn run_all_defaults(
    query: &Query,
    operators: &[Box<dyn Operator>],
    engine: &dyn RelationalEngine,
) -> Result<Vec<QueryResult>, EngineError> {
    let k = operators.len();
    let n = 1usize << k;
    let mut runs = Vec::with_capacity(n.max(1));
    for bits in 0..n.max(1) {
        let defaults: Vec<bool> = (0..k).map(|i| (bits >> i) & 1 == 1).collect();
        let sql = rewriter::rewrite(query, operators, &defaults);
        runs.push(engine.execute(&sql).await?);
    }
    Ok(runs)
}

fn cell_at(result: &QueryResult, col: usize) -> Option<f64> {
    result.rows.first().and_then(|row| row.get(col)).and_then(Value::as_f64)
}

/// Runs every default combination, classifies the result shape, and
/// computes sound bounds plus error (spec.md §4.4's per-round
/// procedure). `k = operators.len()` semantic predicates yield `2^k`
/// runs; `k = 0` still runs once (the query has no remaining semantic
/// predicates to default).
pub async fn compute(
    query: &Query,
    operators: &[Box<dyn Operator>],
    engine: &dyn RelationalEngine,
) -> Result<Bounds, EngineError> {
    let runs = run_all_defaults(query, operators, engine).await?;

    let is_aggregate = !runs.is_empty() && runs.iter().all(QueryResult::single_row_numeric);

    if is_aggregate {
        let ncols = runs
            .iter()
            .map(|r| r.columns.len())
            .max()
            .unwrap_or(0)
            .max(query.select_items.len());

        let mut bounds: Vec<CellBounds> = (0..ncols)
            .map(|col| {
                let cells: Vec<Option<f64>> = runs.iter().map(|r| cell_at(r, col)).collect();
                aggregate::cell_bounds(&cells)
            })
            .collect();

        let (sum_items, avg_positions) = replace_avg(&query.select_items, "SUM");
        if !avg_positions.is_empty() {
            let (count_items, _) = replace_avg(&query.select_items, "COUNT");
            let sum_query = Query {
                select_items: sum_items,
                ..query.clone()
            };
            let count_query = Query {
                select_items: count_items,
                ..query.clone()
            };
            let sum_runs = run_all_defaults(&sum_query, operators, engine).await?;
            let count_runs = run_all_defaults(&count_query, operators, engine).await?;

            for &pos in &avg_positions {
                let sum_cells: Vec<Option<f64>> =
                    sum_runs.iter().map(|r| cell_at(r, pos)).collect();
                let count_cells: Vec<Option<f64>> =
                    count_runs.iter().map(|r| cell_at(r, pos)).collect();
                bounds[pos] = aggregate::avg_from_sum_count(
                    aggregate::cell_bounds(&sum_cells),
                    aggregate::cell_bounds(&count_cells),
                );
            }
        }

        let error = aggregate::mean_error(&bounds);
        let columns = runs.iter().find(|r| !r.columns.is_empty()).map(|r| r.columns.clone()).unwrap_or_default();
        let best_guess = runs.last().and_then(|r| r.rows.first().cloned());

        Ok(Bounds::Aggregate(AggregateBounds {
            columns,
            bounds,
            error,
            best_guess,
        }))
    } else {
        Ok(Bounds::Retrieval(retrieval::compute(&runs, query.limit)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::engine_db::SqliteEngine;
    use crate::operators::UnaryFilterOperator;

    async fn seed_cars(rows: &[&str]) -> SqliteEngine {
        let engine = SqliteEngine::in_memory().await.unwrap();
        engine.execute_ddl("CREATE TABLE cars(pic TEXT)").await.unwrap();
        for pic in rows {
            engine
                .execute_ddl(&format!("INSERT INTO cars VALUES ('{pic}')"))
                .await
                .unwrap();
        }
        engine
    }

    #[tokio::test]
    async fn count_bounds_tighten_as_rows_are_decided() {
        let engine = seed_cars(&["a.jpeg", "b.jpeg", "c.jpeg"]).await;
        let catalog = Catalog::load(&engine).await.unwrap();
        let query = crate::query::parse_and_qualify(
            "SELECT COUNT(*) FROM cars c WHERE NLfilter(c.pic, 'a red car')",
            &catalog,
        )
        .unwrap();
        let mut op = UnaryFilterOperator::new(query.predicates[0].clone(), &query);
        op.prepare(&engine).await.unwrap();
        let operators: Vec<Box<dyn Operator>> = vec![Box::new(op)];

        let bounds = compute(&query, &operators, &engine).await.unwrap();
        match bounds {
            Bounds::Aggregate(a) => {
                assert_eq!(a.bounds[0].lower, 0.0);
                assert_eq!(a.bounds[0].upper, 3.0);
            }
            Bounds::Retrieval(_) => panic!("COUNT(*) must classify as aggregate"),
        }
    }

    #[tokio::test]
    async fn retrieval_query_with_no_predicates_has_zero_error() {
        let engine = seed_cars(&["a.jpeg"]).await;
        let catalog = Catalog::load(&engine).await.unwrap();
        let query = crate::query::parse_and_qualify("SELECT pic FROM cars c", &catalog).unwrap();
        let operators: Vec<Box<dyn Operator>> = Vec::new();
        let bounds = compute(&query, &operators, &engine).await.unwrap();
        match bounds {
            Bounds::Retrieval(r) => assert_eq!(r.error, 0.0),
            Bounds::Aggregate(_) => panic!("SELECT pic must classify as retrieval"),
        }
    }
}
