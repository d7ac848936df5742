//! A read view over the relational engine's schema, shared by the
//! parser's qualification step and by operator `prepare()` (spec.md §3,
//! SPEC_FULL.md §3 "Catalog").

use std::collections::HashMap;

use crate::engine_db::{ColumnInfo, EngineError, RelationalEngine};

/// The type tag driving item encoding for the LLM client
/// (SPEC_FULL.md §3 "DataType"). `Audio` from the original source is
/// dropped — it never worked there either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Num,
    Text,
    Image,
}

impl DataType {
    /// Classifies a declared SQL type, falling back to `Text` for
    /// anything not recognized as numeric. Image columns are
    /// recognized by a `.jpeg`-path heuristic applied to the *value*,
    /// not the declared type (see `Catalog::is_image_column`), matching
    /// `tdb/operators/semantic_filter.py`'s `_encode_item`.
    fn from_sql_type(sql_type: &str) -> Self {
        let upper = sql_type.to_ascii_uppercase();
        if upper.contains("INT") || upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") || upper.contains("NUMERIC") {
            DataType::Num
        } else {
            DataType::Text
        }
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    tables: HashMap<String, Vec<ColumnInfo>>,
}

impl Catalog {
    pub async fn load(engine: &dyn RelationalEngine) -> Result<Self, EngineError> {
        Ok(Self {
            tables: engine.schema().await?,
        })
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    pub fn columns(&self, table: &str) -> Option<&[ColumnInfo]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    pub fn column_type(&self, table: &str, column: &str) -> Option<DataType> {
        self.columns(table)?
            .iter()
            .find(|c| c.name == column)
            .map(|c| DataType::from_sql_type(&c.sql_type))
    }
}
