//! `COPY <table> FROM '<path>' DELIMITER '<d>'` handling, ported from
//! `tdb/console.py`'s `Console.copy_csv`: rows are loaded verbatim as
//! `INSERT` statements and left untyped — image/text columns keep
//! holding whatever the CSV cell contains (a file path, for image
//! columns) and are only interpreted by the engine's semantic operators
//! at classification time.

use anyhow::{anyhow, Context, Result};
use thalamusdb::RelationalEngine;

pub struct CopyStatement {
    pub table: String,
    pub path: String,
    pub delimiter: u8,
}

/// Parses `COPY <table> FROM '<path>' DELIMITER '<d>'`, tolerating the
/// trailing `;` the console strips before dispatch.
pub fn parse_copy(sql: &str) -> Result<CopyStatement> {
    let trimmed = sql.trim().trim_end_matches(';').trim();
    let upper = trimmed.to_ascii_uppercase();
    if !upper.starts_with("COPY ") {
        return Err(anyhow!("not a COPY statement: {trimmed}"));
    }

    let rest = trimmed[5..].trim();
    let (table, rest) = split_keyword(rest, "FROM")?;
    let (path, rest) = take_quoted(rest.trim())?;
    let (_, rest) = split_keyword(rest.trim(), "DELIMITER")?;
    let (delim, _) = take_quoted(rest.trim())?;

    let delimiter = delim.as_bytes().first().copied().unwrap_or(b',');

    Ok(CopyStatement {
        table: table.trim().to_string(),
        path,
        delimiter,
    })
}

fn split_keyword<'a>(input: &'a str, keyword: &str) -> Result<(&'a str, &'a str)> {
    let upper = input.to_ascii_uppercase();
    let idx = upper
        .find(keyword)
        .ok_or_else(|| anyhow!("expected {keyword} in COPY statement"))?;
    Ok((&input[..idx], &input[idx + keyword.len()..]))
}

fn take_quoted(input: &str) -> Result<(String, &str)> {
    let input = input.trim();
    let mut chars = input.char_indices();
    let (_, quote) = chars.next().ok_or_else(|| anyhow!("expected quoted literal"))?;
    if quote != '\'' {
        return Err(anyhow!("expected a single-quoted literal, found: {input}"));
    }
    for (idx, c) in chars {
        if c == '\'' {
            return Ok((input[1..idx].to_string(), &input[idx + 1..]));
        }
    }
    Err(anyhow!("unterminated quoted literal: {input}"))
}

/// Streams the CSV at `stmt.path` into `stmt.table` via `INSERT`
/// statements, one per row, quoting every field as a string literal and
/// leaning on SQLite's type-affinity coercion for numeric columns.
pub async fn copy_csv(engine: &dyn RelationalEngine, stmt: &CopyStatement) -> Result<usize> {
    let columns = engine
        .columns(&stmt.table)
        .await
        .with_context(|| format!("table {} is not declared; run CREATE TABLE first", stmt.table))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(stmt.delimiter)
        .has_headers(true)
        .from_path(&stmt.path)
        .with_context(|| format!("failed to open {}", stmt.path))?;

    let header = reader.headers()?.clone();
    let mut inserted = 0usize;

    for record in reader.records() {
        let record = record?;
        let mut values = Vec::with_capacity(columns.len());
        for col in &columns {
            let cell = header
                .iter()
                .position(|h| h == col.name)
                .and_then(|idx| record.get(idx))
                .unwrap_or("");
            values.push(format!("'{}'", cell.replace('\'', "''")));
        }
        let sql = format!(
            "INSERT INTO {} VALUES ({})",
            stmt.table,
            values.join(", ")
        );
        engine.execute_ddl(&sql).await.map_err(|e| anyhow!(e))?;
        inserted += 1;
    }

    Ok(inserted)
}
