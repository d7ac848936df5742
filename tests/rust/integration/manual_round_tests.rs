//! Drives `UnaryFilterOperator` and `bounds::compute` through a few
//! manual rounds, checking that the interval tightens monotonically as
//! rows are decided (spec.md §4.4, §4.5).

use async_trait::async_trait;
use thalamusdb::bounds::Bounds;
use thalamusdb::engine_db::{RelationalEngine, SqliteEngine};
use thalamusdb::llm::{Classification, Item, LlmClient, LlmError};
use thalamusdb::operators::{Operator, UnaryFilterOperator};
use thalamusdb::{bounds, parse_and_qualify, Catalog};

/// Decides `true` for any item whose text contains "b", `false`
/// otherwise — lets a test assert on a known, non-trivial result.
struct ContainsB;

#[async_trait]
impl LlmClient for ContainsB {
    async fn classify(&self, _condition: &str, item: &Item) -> Result<Classification, LlmError> {
        let decision = match item {
            Item::Text(t) => t.contains('b'),
            _ => false,
        };
        Ok(Classification {
            decision,
            input_tokens: 5,
            output_tokens: 1,
        })
    }
}

#[tokio::test]
async fn bounds_tighten_monotonically_as_batches_are_processed() {
    let engine = SqliteEngine::in_memory().await.unwrap();
    engine.execute_ddl("CREATE TABLE cars(pic TEXT)").await.unwrap();
    for pic in ["alpha", "bravo", "bingo", "charlie"] {
        engine
            .execute_ddl(&format!("INSERT INTO cars VALUES ('{pic}')"))
            .await
            .unwrap();
    }
    let catalog = Catalog::load(&engine).await.unwrap();
    let query = parse_and_qualify(
        "SELECT COUNT(*) FROM cars c WHERE NLfilter(c.pic, 'contains b')",
        &catalog,
    )
    .unwrap();

    let mut op = UnaryFilterOperator::new(query.predicates[0].clone(), &query);
    op.prepare(&engine).await.unwrap();
    let llm = ContainsB;

    let mut operators: Vec<Box<dyn Operator>> = vec![Box::new(op)];

    let before = bounds::compute(&query, &operators, &engine).await.unwrap();
    let before_error = before.error();
    let Bounds::Aggregate(before_agg) = before else {
        panic!("COUNT(*) must classify as aggregate");
    };
    assert_eq!(before_agg.bounds[0].lower, 0.0);
    assert_eq!(before_agg.bounds[0].upper, 4.0);

    operators[0].execute(4, None, &engine, &llm).await.unwrap();

    let after = bounds::compute(&query, &operators, &engine).await.unwrap();
    let after_error = after.error();
    let Bounds::Aggregate(after_agg) = after else {
        panic!("COUNT(*) must classify as aggregate");
    };
    assert_eq!(after_agg.bounds[0].lower, 2.0);
    assert_eq!(after_agg.bounds[0].upper, 2.0);
    assert!(after_error <= before_error);
}
