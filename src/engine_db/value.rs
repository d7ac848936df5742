//! Cell values and result sets returned by the relational engine.

use std::fmt;

/// One cell of a result row. Deliberately untyped-union-like, since the
/// semantic operators and bound computer need to compare, hash and
/// serialize cells without knowing the declared SQL type up front.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Real(f64),
    Text(String),
    Bool(bool),
    Blob(Vec<u8>),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Real(r) => Some(*r),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Render a cell as a SQL literal, e.g. for string-substitution into
    /// an `UPDATE ... WHERE base_col = <literal>` statement.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Real(r) => r.to_string(),
            Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Value::Blob(bytes) => format!("X'{}'", hex_encode(bytes)),
        }
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Blob(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

/// A column's declared name and raw SQL type text (e.g. `"INTEGER"`,
/// `"TEXT"`) — kept as a string rather than a closed enum because
/// operator `prepare()` splices it verbatim into `CREATE TEMPORARY
/// TABLE` DDL (spec.md §3).
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub sql_type: String,
}

/// The result of running one SQL statement.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn single_row_numeric(&self) -> bool {
        self.rows.len() == 1
            && self.rows[0]
                .iter()
                .all(|v| v.as_f64().is_some() || v.is_null())
    }
}
