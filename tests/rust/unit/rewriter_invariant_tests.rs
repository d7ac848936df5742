//! The rewriter must never leave a semantic predicate call in its
//! output, and the optimistic/pessimistic defaults must bracket each
//! other (spec.md §4.3's soundness requirement).

use thalamusdb::engine_db::{RelationalEngine, SqliteEngine};
use thalamusdb::operators::{Operator, UnaryFilterOperator};
use thalamusdb::rewriter;
use thalamusdb::{parse_and_qualify, Catalog};

async fn prepared_unary(sql: &str) -> (SqliteEngine, thalamusdb::Query, Box<dyn Operator>) {
    let engine = SqliteEngine::in_memory().await.unwrap();
    engine.execute_ddl("CREATE TABLE cars(pic TEXT)").await.unwrap();
    for pic in ["a.jpeg", "b.jpeg", "c.jpeg"] {
        engine
            .execute_ddl(&format!("INSERT INTO cars VALUES ('{pic}')"))
            .await
            .unwrap();
    }
    let catalog = Catalog::load(&engine).await.unwrap();
    let query = parse_and_qualify(sql, &catalog).unwrap();
    let mut op = UnaryFilterOperator::new(query.predicates[0].clone(), &query);
    op.prepare(&engine).await.unwrap();
    (engine, query, Box::new(op))
}

#[tokio::test]
async fn rewritten_sql_never_contains_the_semantic_call() {
    let (_engine, query, op) =
        prepared_unary("SELECT COUNT(*) FROM cars c WHERE NLfilter(c.pic, 'red')").await;
    let optimistic = rewriter::rewrite(&query, std::slice::from_ref(&op), &[true]);
    let pessimistic = rewriter::rewrite(&query, std::slice::from_ref(&op), &[false]);
    assert!(!optimistic.contains("NLfilter"));
    assert!(!pessimistic.contains("NLfilter"));
}

#[tokio::test]
async fn optimistic_count_is_never_smaller_than_pessimistic_before_any_decision() {
    let (engine, query, op) =
        prepared_unary("SELECT COUNT(*) FROM cars c WHERE NLfilter(c.pic, 'red')").await;

    let optimistic_sql = rewriter::rewrite(&query, std::slice::from_ref(&op), &[true]);
    let pessimistic_sql = rewriter::rewrite(&query, std::slice::from_ref(&op), &[false]);

    let optimistic_count = engine.execute(&optimistic_sql).await.unwrap();
    let pessimistic_count = engine.execute(&pessimistic_sql).await.unwrap();

    let opt_val = optimistic_count.rows[0][0].as_f64().unwrap();
    let pes_val = pessimistic_count.rows[0][0].as_f64().unwrap();
    assert!(opt_val >= pes_val);
}
