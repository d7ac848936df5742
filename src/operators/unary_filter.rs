//! `UnaryFilter` operator, grounded on
//! `tdb/operators/semantic_filter.py`'s `UnaryFilter`: a scratch table
//! mirroring the base table, filled with the alias-local pure-SQL
//! predicates already pushed down, with one LLM call per distinct
//! unevaluated value of the predicate's column.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use super::{base_col, Operator, OperatorError, ExecuteOutcome, LLM_RETRIES};
use crate::counters::TdbCounters;
use crate::engine_db::{ColumnInfo, RelationalEngine, Value};
use crate::llm::{Item, LlmClient, LlmError};
use crate::query::{Predicate, Query};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

pub struct UnaryFilterOperator {
    predicate: Predicate,
    scratch_name: String,
    pure_sql_conjunct: String,
    columns: Vec<ColumnInfo>,
    counters: TdbCounters,
}

impl UnaryFilterOperator {
    /// `predicate` must be [`Predicate::Unary`].
    pub fn new(predicate: Predicate, query: &Query) -> Self {
        debug_assert!(matches!(predicate, Predicate::Unary { .. }));
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let alias = match &predicate {
            Predicate::Unary { alias, .. } => alias.clone(),
            Predicate::Join { .. } => unreachable!("UnaryFilterOperator requires Predicate::Unary"),
        };
        let pure_sql_conjunct = query.pure_sql_for_alias(&alias);
        Self {
            predicate,
            scratch_name: format!("scratch_uf{id}"),
            pure_sql_conjunct,
            columns: Vec::new(),
            counters: TdbCounters::default(),
        }
    }

    fn table(&self) -> &str {
        match &self.predicate {
            Predicate::Unary { table, .. } => table,
            Predicate::Join { .. } => unreachable!(),
        }
    }

    fn column(&self) -> &str {
        match &self.predicate {
            Predicate::Unary { column, .. } => column,
            Predicate::Join { .. } => unreachable!(),
        }
    }

    fn condition(&self) -> &str {
        match &self.predicate {
            Predicate::Unary { condition, .. } => condition,
            Predicate::Join { .. } => unreachable!(),
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
impl Operator for UnaryFilterOperator {
    async fn prepare(&mut self, engine: &dyn RelationalEngine) -> Result<(), OperatorError> {
        self.columns = engine
            .columns(self.table())
            .await
            .map_err(OperatorError::ScratchTableSetup)?;

        let column_defs: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} {}", base_col(&c.name), c.sql_type))
            .collect();
        let ddl = format!(
            "CREATE TEMPORARY TABLE {} (result BOOLEAN, simulated BOOLEAN, {})",
            self.scratch_name,
            column_defs.join(", ")
        );
        engine
            .execute_ddl(&ddl)
            .await
            .map_err(OperatorError::ScratchTableSetup)?;

        let col_list: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        let insert = format!(
            "INSERT INTO {} SELECT NULL, NULL, {} FROM {} WHERE {}",
            self.scratch_name,
            col_list.join(", "),
            self.table(),
            self.pure_sql_conjunct
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
        order_hint: Option<(String, bool)>,
        engine: &dyn RelationalEngine,
        llm: &dyn LlmClient,
    ) -> Result<ExecuteOutcome, OperatorError> {
        let predicate_col = base_col(self.column());
        let order_clause = match &order_hint {
            Some((col, asc)) => format!(
                " ORDER BY {} {}",
                base_col(col),
                if *asc { "ASC" } else { "DESC" }
            ),
            None => String::new(),
        };
        let retrieval = format!(
            "SELECT DISTINCT {} FROM {} WHERE result IS NULL{} LIMIT {}",
            predicate_col, self.scratch_name, order_clause, batch_size
        );
        let pending = engine.execute(&retrieval).await?;

        let mut decided = 0usize;
        for row in &pending.rows {
            let Some(value) = row.first() else { continue };
            if value.is_null() {
                continue;
            }
            let item = Item::encode(value, self.value_data_type(value));
            match Self::classify_with_retry(llm, self.condition(), &item).await {
                Ok((decision, input_tokens, output_tokens)) => {
                    self.counters.record_call(input_tokens, output_tokens);
                    let update = format!(
                        "UPDATE {} SET result = {}, simulated = {} WHERE {} = {}",
                        self.scratch_name,
                        bool_literal(decision),
                        bool_literal(decision),
                        predicate_col,
                        value.to_sql_literal()
                    );
                    engine.execute_ddl(&update).await?;
                    decided += 1;
                }
                Err(_) => {
                    // Persistent failure: leave this value `Unknown` for
                    // this round (spec.md §4.2, §7).
                    continue;
                }
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

impl UnaryFilterOperator {
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
