//! Malformed-input handling across the parse -> qualify boundary
//! (spec.md §3's parser contract: reject, don't panic).

use thalamusdb::engine_db::{RelationalEngine, SqliteEngine};
use thalamusdb::{parse_and_qualify, Catalog};

async fn cars_catalog() -> (SqliteEngine, Catalog) {
    let engine = SqliteEngine::in_memory().await.unwrap();
    engine
        .execute_ddl("CREATE TABLE cars(pic TEXT, price INTEGER)")
        .await
        .unwrap();
    let catalog = Catalog::load(&engine).await.unwrap();
    (engine, catalog)
}

#[tokio::test]
async fn empty_statement_is_rejected() {
    let (_engine, catalog) = cars_catalog().await;
    assert!(parse_and_qualify("", &catalog).is_err());
}

#[tokio::test]
async fn missing_from_clause_is_rejected() {
    let (_engine, catalog) = cars_catalog().await;
    assert!(parse_and_qualify("SELECT pic", &catalog).is_err());
}

#[tokio::test]
async fn unclosed_paren_is_rejected() {
    let (_engine, catalog) = cars_catalog().await;
    assert!(parse_and_qualify(
        "SELECT * FROM cars c WHERE NLfilter(c.pic, 'red'",
        &catalog
    )
    .is_err());
}

#[tokio::test]
async fn ambiguous_column_across_two_aliases_is_rejected() {
    let engine = SqliteEngine::in_memory().await.unwrap();
    engine
        .execute_ddl("CREATE TABLE cars(pic TEXT, price INTEGER)")
        .await
        .unwrap();
    engine
        .execute_ddl("CREATE TABLE buyers(pic TEXT, name TEXT)")
        .await
        .unwrap();
    let catalog = Catalog::load(&engine).await.unwrap();

    assert!(parse_and_qualify("SELECT pic FROM cars c, buyers b", &catalog).is_err());
}

#[tokio::test]
async fn trailing_semicolon_and_whitespace_are_tolerated() {
    let (_engine, catalog) = cars_catalog().await;
    let query = parse_and_qualify("  SELECT * FROM cars c  ;  ", &catalog).unwrap();
    assert_eq!(query.from.len(), 1);
}
