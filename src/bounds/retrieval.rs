//! Retrieval (`SELECT *`, non-aggregate) bounds: intersection and union
//! of rows across all `2^k` runs, LIMIT-aware (spec.md §4.4).

use std::collections::{HashMap, HashSet};

use crate::engine_db::{QueryResult, Value};

fn row_key(row: &[Value]) -> String {
    row.iter()
        .map(Value::to_sql_literal)
        .collect::<Vec<_>>()
        .join("\u{1}")
}

#[derive(Debug, Clone)]
pub struct RetrievalBounds {
    pub columns: Vec<String>,
    /// Rows present under every default assignment: certainly in the
    /// answer.
    pub intersection: Vec<Vec<Value>>,
    /// Rows present under some default assignment: possibly in the
    /// answer, and the best-guess result (spec.md §4.5).
    pub union: Vec<Vec<Value>>,
    pub error: f64,
}

pub fn compute(runs: &[QueryResult], limit: Option<u64>) -> RetrievalBounds {
    let columns = runs
        .iter()
        .find(|r| !r.columns.is_empty())
        .map(|r| r.columns.clone())
        .unwrap_or_default();

    let mut by_key: HashMap<String, Vec<Value>> = HashMap::new();
    let mut present_in: HashMap<String, usize> = HashMap::new();

    for run in runs {
        let mut seen_this_run: HashSet<String> = HashSet::new();
        for row in &run.rows {
            let key = row_key(row);
            by_key.entry(key.clone()).or_insert_with(|| row.clone());
            if seen_this_run.insert(key.clone()) {
                *present_in.entry(key).or_insert(0) += 1;
            }
        }
    }

    let mut union: Vec<Vec<Value>> = by_key.values().cloned().collect();
    let mut intersection: Vec<Vec<Value>> = by_key
        .iter()
        .filter(|(key, _)| present_in.get(*key).copied().unwrap_or(0) == runs.len())
        .map(|(_, row)| row.clone())
        .collect();

    if let Some(limit) = limit {
        let limit = limit as usize;
        union.truncate(limit);
        intersection.truncate(limit);
    }

    let error = if union.is_empty() {
        0.0
    } else {
        (union.len() as f64 - intersection.len() as f64)
            / (union.len() as f64 + intersection.len() as f64)
    };

    RetrievalBounds {
        columns,
        intersection,
        union,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(rows: Vec<Vec<Value>>) -> QueryResult {
        QueryResult {
            columns: vec!["pic".to_string()],
            rows,
        }
    }

    #[test]
    fn intersection_and_union_over_two_runs() {
        let runs = vec![
            result(vec![vec![Value::Text("a".into())], vec![Value::Text("b".into())]]),
            result(vec![vec![Value::Text("a".into())]]),
        ];
        let bounds = compute(&runs, None);
        assert_eq!(bounds.intersection.len(), 1);
        assert_eq!(bounds.union.len(), 2);
        assert!(bounds.error > 0.0);
    }

    #[test]
    fn equal_runs_have_zero_error() {
        let runs = vec![
            result(vec![vec![Value::Text("a".into())]]),
            result(vec![vec![Value::Text("a".into())]]),
        ];
        let bounds = compute(&runs, None);
        assert_eq!(bounds.error, 0.0);
    }

    #[test]
    fn limit_truncates_both_bounds() {
        let runs = vec![result(vec![
            vec![Value::Text("a".into())],
            vec![Value::Text("b".into())],
            vec![Value::Text("c".into())],
        ])];
        let bounds = compute(&runs, Some(2));
        assert_eq!(bounds.union.len(), 2);
        assert_eq!(bounds.intersection.len(), 2);
    }
}
