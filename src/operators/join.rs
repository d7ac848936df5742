//! `Join` operator (nested-loops batch), grounded on
//! `tdb/operators/semantic_join.py`'s `SemanticSimpleJoin`: a scratch
//! table over the Cartesian product of both sides, with one LLM call
//! per distinct unevaluated pair.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use super::{base_col, ExecuteOutcome, Operator, OperatorError, LLM_RETRIES};
use crate::counters::TdbCounters;
use crate::engine_db::{ColumnInfo, RelationalEngine, Value};
use crate::llm::{Item, LlmClient, LlmError};
use crate::query::{Predicate, Query};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

fn left_col(column: &str) -> String {
    format!("left_{column}")
}

fn right_col(column: &str) -> String {
    format!("right_{column}")
}

pub struct JoinOperator {
    predicate: Predicate,
    scratch_name: String,
    left_pure_sql: String,
    right_pure_sql: String,
    left_columns: Vec<ColumnInfo>,
    right_columns: Vec<ColumnInfo>,
    counters: TdbCounters,
}

impl JoinOperator {
    /// `predicate` must be [`Predicate::Join`].
    pub fn new(predicate: Predicate, query: &Query) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let (left_alias, right_alias) = match &predicate {
            Predicate::Join {
                left_alias,
                right_alias,
                ..
            } => (left_alias.clone(), right_alias.clone()),
            Predicate::Unary { .. } => unreachable!("JoinOperator requires Predicate::Join"),
        };
        Self {
            left_pure_sql: query.pure_sql_for_alias(&left_alias),
            right_pure_sql: query.pure_sql_for_alias(&right_alias),
            predicate,
            scratch_name: format!("scratch_j{id}"),
            left_columns: Vec::new(),
            right_columns: Vec::new(),
            counters: TdbCounters::default(),
        }
    }

    fn fields(&self) -> (&str, &str, &str, &str, &str) {
        match &self.predicate {
            Predicate::Join {
                left_table,
                left_column,
                right_table,
                right_column,
                condition,
                ..
            } => (left_table, left_column, right_table, right_column, condition),
            Predicate::Unary { .. } => unreachable!(),
        }
    }

    async fn classify_with_retry(
        llm: &dyn LlmClient,
        condition: &str,
        item: &Item,
    ) -> Result<(bool, u32, u32), LlmError> {
        let mut last_err = None;
        for _ in 0..LLM_RETRIES {
            match llm.classify(condition, item).await {
                Ok(c) => return Ok((c.decision, c.input_tokens, c.output_tokens)),
                Err(err) if err.is_transient() => last_err = Some(err),
                Err(err) => return Err(err),
            }
        }
        Err(last_err.unwrap())
    }
}

#[async_trait]
impl Operator for JoinOperator {
    async fn prepare(&mut self, engine: &dyn RelationalEngine) -> Result<(), OperatorError> {
        let (left_table, _left_column, right_table, _right_column, _condition) = {
            let (lt, lc, rt, rc, c) = self.fields();
            (lt.to_string(), lc.to_string(), rt.to_string(), rc.to_string(), c.to_string())
        };

        self.left_columns = engine
            .columns(&left_table)
            .await
            .map_err(OperatorError::ScratchTableSetup)?;
        self.right_columns = engine
            .columns(&right_table)
            .await
            .map_err(OperatorError::ScratchTableSetup)?;

        let mut column_defs: Vec<String> = self
            .left_columns
            .iter()
            .map(|c| format!("{} {}", left_col(&c.name), c.sql_type))
            .collect();
        column_defs.extend(
            self.right_columns
                .iter()
                .map(|c| format!("{} {}", right_col(&c.name), c.sql_type)),
        );
        let ddl = format!(
            "CREATE TEMPORARY TABLE {} (result BOOLEAN, simulated BOOLEAN, {})",
            self.scratch_name,
            column_defs.join(", ")
        );
        engine
            .execute_ddl(&ddl)
            .await
            .map_err(OperatorError::ScratchTableSetup)?;

        let select_list: Vec<String> = self
            .left_columns
            .iter()
            .map(|c| format!("L.{}", c.name))
            .chain(self.right_columns.iter().map(|c| format!("R.{}", c.name)))
            .collect();
        let insert = format!(
            "INSERT INTO {} SELECT NULL, NULL, {} FROM {} L, {} R WHERE ({}) AND ({})",
            self.scratch_name,
            select_list.join(", "),
            left_table,
            right_table,
            self.left_pure_sql,
            self.right_pure_sql
        );
        engine
            .execute_ddl(&insert)
            .await
            .map_err(OperatorError::ScratchTableSetup)?;

        Ok(())
    }

    async fn execute(
        &mut self,
        batch_size: u32,
        _order_hint: Option<(String, bool)>,
        engine: &dyn RelationalEngine,
        llm: &dyn LlmClient,
    ) -> Result<ExecuteOutcome, OperatorError> {
        let (_left_table, left_column, _right_table, right_column, condition) = {
            let (lt, lc, rt, rc, c) = self.fields();
            (lt.to_string(), lc.to_string(), rt.to_string(), rc.to_string(), c.to_string())
        };
        let left_key = left_col(&left_column);
        let right_key = right_col(&right_column);

        let retrieval = format!(
            "SELECT DISTINCT {}, {} FROM {} WHERE result IS NULL LIMIT {}",
            left_key, right_key, self.scratch_name, batch_size
        );
        let pending = engine.execute(&retrieval).await?;

        let mut decided = 0usize;
        for row in &pending.rows {
            let (Some(left_val), Some(right_val)) = (row.first(), row.get(1)) else {
                continue;
            };
            if left_val.is_null() || right_val.is_null() {
                continue;
            }
            let pair = Item::pair(
                Item::encode(left_val, self.value_data_type(left_val)),
                Item::encode(right_val, self.value_data_type(right_val)),
            );
            match Self::classify_with_retry(llm, &condition, &pair).await {
                Ok((decision, input_tokens, output_tokens)) => {
                    self.counters.record_call(input_tokens, output_tokens);
                    let update = format!(
                        "UPDATE {} SET result = {}, simulated = {} WHERE {} = {} AND {} = {}",
                        self.scratch_name,
                        bool_literal(decision),
                        bool_literal(decision),
                        left_key,
                        left_val.to_sql_literal(),
                        right_key,
                        right_val.to_sql_literal()
                    );
                    engine.execute_ddl(&update).await?;
                    decided += 1;
                }
                Err(_) => continue,
            }
        }

        Ok(ExecuteOutcome {
            rows_decided: decided,
        })
    }

    fn scratch_table(&self) -> &str {
        &self.scratch_name
    }

    fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    fn counters(&self) -> &TdbCounters {
        &self.counters
    }
}

impl JoinOperator {
    fn value_data_type(&self, value: &Value) -> crate::catalog::DataType {
        match value {
            Value::Blob(_) => crate::catalog::DataType::Image,
            Value::Int(_) | Value::Real(_) | Value::Bool(_) => crate::catalog::DataType::Num,
            Value::Text(_) | Value::Null => crate::catalog::DataType::Text,
        }
    }
}

fn bool_literal(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::engine_db::SqliteEngine;
    use crate::llm::Classification;

    struct StubLlm;

    #[async_trait]
    impl LlmClient for StubLlm {
        async fn classify(&self, _condition: &str, _item: &Item) -> Result<Classification, LlmError> {
            Ok(Classification {
                decision: true,
                input_tokens: 4,
                output_tokens: 1,
            })
        }
    }

    async fn setup() -> (SqliteEngine, Query) {
        let engine = SqliteEngine::in_memory().await.unwrap();
        engine.execute_ddl("CREATE TABLE cars(pic TEXT)").await.unwrap();
        engine.execute_ddl("CREATE TABLE buyers(name TEXT)").await.unwrap();
        engine.execute_ddl("INSERT INTO cars VALUES ('a.jpeg')").await.unwrap();
        engine.execute_ddl("INSERT INTO cars VALUES ('b.jpeg')").await.unwrap();
        engine.execute_ddl("INSERT INTO buyers VALUES ('alice')").await.unwrap();
        let catalog = Catalog::load(&engine).await.unwrap();
        let query = crate::query::parse_and_qualify(
            "SELECT * FROM cars c, buyers b WHERE NLjoin(c.pic, b.name, 'alice would buy this car')",
            &catalog,
        )
        .unwrap();
        (engine, query)
    }

    #[tokio::test]
    async fn prepare_fills_cartesian_product() {
        let (engine, query) = setup().await;
        let mut op = JoinOperator::new(query.predicates[0].clone(), &query);
        op.prepare(&engine).await.unwrap();
        let rows = engine
            .execute(&format!("SELECT * FROM {}", op.scratch_table()))
            .await
            .unwrap();
        assert_eq!(rows.rows.len(), 2);
    }

    #[tokio::test]
    async fn execute_decides_all_pairs() {
        let (engine, query) = setup().await;
        let mut op = JoinOperator::new(query.predicates[0].clone(), &query);
        op.prepare(&engine).await.unwrap();
        let llm = StubLlm;
        let outcome = op.execute(10, None, &engine, &llm).await.unwrap();
        assert_eq!(outcome.rows_decided, 2);
        assert_eq!(op.counters().llm_calls, 2);
    }
}
