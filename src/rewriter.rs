//! Given a mapping `predicate -> default bit`, emits an equivalent
//! pure-SQL query that references each predicate's scratch table
//! instead of the `NLfilter`/`NLjoin` call (spec.md §4.3).
//!
//! Implemented as string substitution over the `original_sql` span
//! captured at parse time, matching `tdb/execution/engine.py`'s
//! `QueryRewriter.pure_sql` rather than an AST splice (SPEC_FULL.md §9).

use crate::operators::{base_col, Operator};
use crate::query::{Predicate, Query};

/// Whether an unevaluated row should count toward the result under this
/// round's default assignment: `true` (optimistic) includes `NULL`
/// alongside `TRUE`; `false` (pessimistic) requires `TRUE` (spec.md §4.3).
pub type DefaultBit = bool;

fn unary_replacement(alias: &str, column: &str, scratch: &str, default: DefaultBit) -> String {
    let key = base_col(column);
    let result_filter = if default {
        "result IS TRUE OR result IS NULL"
    } else {
        "result IS TRUE"
    };
    format!("{alias}.{column} IN (SELECT {key} FROM {scratch} WHERE {result_filter})")
}

fn join_replacement(
    left_alias: &str,
    left_column: &str,
    right_alias: &str,
    right_column: &str,
    scratch: &str,
    default: DefaultBit,
) -> String {
    let left_key = format!("left_{left_column}");
    let right_key = format!("right_{right_column}");
    let result_filter = if default {
        "result IS TRUE OR result IS NULL"
    } else {
        "result IS TRUE"
    };
    format!(
        "({left_alias}.{left_column}, {right_alias}.{right_column}) IN \
         (SELECT {left_key}, {right_key} FROM {scratch} WHERE {result_filter})"
    )
}

/// Substitutes each operator's predicate occurrence in `query`'s
/// rendered SQL with a scratch-table membership test, keyed by
/// `defaults[i]` (aligned with `operators[i]`).
pub fn rewrite(query: &Query, operators: &[Box<dyn Operator>], defaults: &[DefaultBit]) -> String {
    let mut sql = query.to_sql();
    for (op, &default) in operators.iter().zip(defaults) {
        let replacement = match op.predicate() {
            Predicate::Unary { alias, column, .. } => {
                unary_replacement(alias, column, op.scratch_table(), default)
            }
            Predicate::Join {
                left_alias,
                left_column,
                right_alias,
                right_column,
                ..
            } => join_replacement(
                left_alias,
                left_column,
                right_alias,
                right_column,
                op.scratch_table(),
                default,
            ),
        };
        sql = sql.replacen(op.predicate().original_sql(), &replacement, 1);
    }
    sql
}
