//! Parsed, qualified queries and the semantic predicates extracted from
//! them (spec.md §3, §4.1).

pub mod ast;
pub mod errors;
pub mod parser;
pub mod qualify;

use std::collections::HashMap;

use crate::catalog::Catalog;
use ast::Expr;
use errors::{ParseError, SchemaError};

/// A semantic predicate, tagged by arity (spec.md §3).
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Unary {
        table: String,
        alias: String,
        column: String,
        condition: String,
        /// Exact rendered SQL of the `NLfilter(...)` call, substituted
        /// verbatim by the rewriter.
        original_sql: String,
    },
    Join {
        left_table: String,
        left_alias: String,
        left_column: String,
        right_table: String,
        right_alias: String,
        right_column: String,
        condition: String,
        original_sql: String,
    },
}

impl Predicate {
    pub fn original_sql(&self) -> &str {
        match self {
            Predicate::Unary { original_sql, .. } => original_sql,
            Predicate::Join { original_sql, .. } => original_sql,
        }
    }
}

/// A parsed and qualified query, ready for the rewriter and bound
/// computer (spec.md §3 "Query").
#[derive(Debug, Clone)]
pub struct Query {
    pub select_items: Vec<Expr>,
    /// (alias, base table), in FROM-clause order — kept a `Vec` rather
    /// than a map so re-rendering the same query is deterministic.
    pub from: Vec<(String, String)>,
    pub where_clause: Option<Expr>,
    pub predicates: Vec<Predicate>,
    /// Per-alias AND-chain of pure-SQL unary conjuncts, pushed down when
    /// building each operator's scratch table (spec.md §3, §4.1).
    pub alias_conjuncts: HashMap<String, Vec<String>>,
    pub group_by: Vec<Expr>,
    pub order_by: Vec<(Expr, bool)>,
    /// `None` means unbounded (absent or a non-literal LIMIT expression).
    pub limit: Option<u64>,
}

impl Query {
    /// The pure-SQL WHERE conjuncts pushed down for `alias`, ANDed
    /// together, or `TRUE` if there are none (spec.md §3).
    pub fn pure_sql_for_alias(&self, alias: &str) -> String {
        match self.alias_conjuncts.get(alias) {
            Some(conjuncts) if !conjuncts.is_empty() => conjuncts.join(" AND "),
            _ => "TRUE".to_string(),
        }
    }

    pub fn table_for_alias(&self, alias: &str) -> Option<&str> {
        self.from
            .iter()
            .find(|(a, _)| a == alias)
            .map(|(_, t)| t.as_str())
    }

    /// Renders the qualified query as SQL, with every semantic
    /// predicate call still present verbatim — the rewriter replaces
    /// those substrings afterward (spec.md §4.3).
    pub fn to_sql(&self) -> String {
        let items = if self.select_items.is_empty() {
            "*".to_string()
        } else {
            self.select_items
                .iter()
                .map(Expr::to_sql)
                .collect::<Vec<_>>()
                .join(", ")
        };

        let from = self
            .from
            .iter()
            .map(|(alias, table)| {
                if alias == table {
                    table.clone()
                } else {
                    format!("{table} {alias}")
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        let mut sql = format!("SELECT {items} FROM {from}");

        if let Some(w) = &self.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(&w.to_sql());
        }
        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(
                &self
                    .group_by
                    .iter()
                    .map(Expr::to_sql)
                    .collect::<Vec<_>>()
                    .join(", "),
            );
        }
        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(
                &self
                    .order_by
                    .iter()
                    .map(|(e, desc)| format!("{} {}", e.to_sql(), if *desc { "DESC" } else { "ASC" }))
                    .collect::<Vec<_>>()
                    .join(", "),
            );
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        sql
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Parses and qualifies one SQL statement against `catalog`
/// (spec.md §4.1).
pub fn parse_and_qualify(sql: &str, catalog: &Catalog) -> Result<Query, QueryError> {
    let raw = parser::parse_query(sql)?;
    let query = qualify::qualify(raw, catalog)?;
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_db::{RelationalEngine, SqliteEngine};

    async fn catalog_with_cars() -> Catalog {
        let engine = SqliteEngine::in_memory().await.unwrap();
        engine
            .execute_ddl("CREATE TABLE cars(pic TEXT, price INTEGER)")
            .await
            .unwrap();
        Catalog::load(&engine).await.unwrap()
    }

    #[tokio::test]
    async fn extracts_unary_predicate() {
        let catalog = catalog_with_cars().await;
        let query = parse_and_qualify(
            "SELECT * FROM cars c WHERE NLfilter(c.pic, 'a red car')",
            &catalog,
        )
        .unwrap();
        assert_eq!(query.predicates.len(), 1);
        match &query.predicates[0] {
            Predicate::Unary { column, condition, .. } => {
                assert_eq!(column, "pic");
                assert_eq!(condition, "a red car");
            }
            other => panic!("expected unary predicate, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn pushes_pure_sql_conjunct_per_alias() {
        let catalog = catalog_with_cars().await;
        let query = parse_and_qualify(
            "SELECT * FROM cars c WHERE c.price > 100 AND NLfilter(c.pic, 'red')",
            &catalog,
        )
        .unwrap();
        assert_eq!(query.pure_sql_for_alias("c"), "c.price > 100");
    }

    #[tokio::test]
    async fn unknown_table_is_rejected() {
        let catalog = catalog_with_cars().await;
        assert!(parse_and_qualify("SELECT * FROM nope n", &catalog).is_err());
    }
}
