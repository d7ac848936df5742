//! spec.md §8's worked end-to-end scenario table, against a 5-row
//! `cars(pic TEXT)` table where every row is "a car".

use async_trait::async_trait;
use thalamusdb::engine_db::{RelationalEngine, SqliteEngine};
use thalamusdb::llm::{Classification, Item, LlmClient, LlmError};
use thalamusdb::{Bounds, Catalog, Constraints, EngineConfig, ExecutionEngine};

struct FixedDecision(bool);

#[async_trait]
impl LlmClient for FixedDecision {
    async fn classify(&self, _condition: &str, _item: &Item) -> Result<Classification, LlmError> {
        Ok(Classification {
            decision: self.0,
            input_tokens: 4,
            output_tokens: 1,
        })
    }
}

async fn five_cars() -> SqliteEngine {
    let engine = SqliteEngine::in_memory().await.unwrap();
    engine.execute_ddl("CREATE TABLE cars(pic TEXT)").await.unwrap();
    for pic in ["1.jpeg", "2.jpeg", "3.jpeg", "4.jpeg", "5.jpeg"] {
        engine
            .execute_ddl(&format!("INSERT INTO cars VALUES ('{pic}')"))
            .await
            .unwrap();
    }
    engine
}

// Scenario 1: retrieval, always-TRUE stub -> all 5 rows survive, error 0.
#[tokio::test]
async fn scenario_1_retrieval_all_true() {
    let engine = five_cars().await;
    let catalog = Catalog::load(&engine).await.unwrap();
    let query = thalamusdb::parse_and_qualify(
        "SELECT * FROM cars c WHERE NLfilter(c.pic, 'a car')",
        &catalog,
    )
    .unwrap();

    let llm = FixedDecision(true);
    let exec = ExecutionEngine::new(
        &engine,
        &llm,
        EngineConfig::default(),
        Constraints::error_only(0.0),
    );
    let result = exec.run(&query).await.unwrap();

    assert_eq!(result.error, 0.0);
    assert_eq!(result.counters.llm_calls, 5);
    assert_eq!(result.best_guess_rows().len(), 5);
}

// Scenario 2: retrieval, always-FALSE stub -> no rows survive, error 0.
#[tokio::test]
async fn scenario_2_retrieval_all_false() {
    let engine = five_cars().await;
    let catalog = Catalog::load(&engine).await.unwrap();
    let query = thalamusdb::parse_and_qualify(
        "SELECT * FROM cars c WHERE NLfilter(c.pic, 'a car')",
        &catalog,
    )
    .unwrap();

    let llm = FixedDecision(false);
    let exec = ExecutionEngine::new(
        &engine,
        &llm,
        EngineConfig::default(),
        Constraints::error_only(0.0),
    );
    let result = exec.run(&query).await.unwrap();

    assert_eq!(result.error, 0.0);
    assert_eq!(result.counters.llm_calls, 5);
    assert_eq!(result.best_guess_rows().len(), 0);
}

// Scenario 3: COUNT(*), always-TRUE stub -> exact count 5.
#[tokio::test]
async fn scenario_3_count_all_true() {
    let engine = five_cars().await;
    let catalog = Catalog::load(&engine).await.unwrap();
    let query = thalamusdb::parse_and_qualify(
        "SELECT COUNT(*) FROM cars c WHERE NLfilter(c.pic, 'a car')",
        &catalog,
    )
    .unwrap();

    let llm = FixedDecision(true);
    let exec = ExecutionEngine::new(
        &engine,
        &llm,
        EngineConfig::default(),
        Constraints::error_only(0.0),
    );
    let result = exec.run(&query).await.unwrap();

    assert_eq!(result.error, 0.0);
    match result.bounds {
        Bounds::Aggregate(a) => {
            assert_eq!(a.bounds[0].lower, 5.0);
            assert_eq!(a.bounds[0].upper, 5.0);
        }
        Bounds::Retrieval(_) => panic!("COUNT(*) must classify as aggregate"),
    }
}

// Scenario 4: COUNT(*), always-FALSE stub -> exact count 0.
#[tokio::test]
async fn scenario_4_count_all_false() {
    let engine = five_cars().await;
    let catalog = Catalog::load(&engine).await.unwrap();
    let query = thalamusdb::parse_and_qualify(
        "SELECT COUNT(*) FROM cars c WHERE NLfilter(c.pic, 'a car')",
        &catalog,
    )
    .unwrap();

    let llm = FixedDecision(false);
    let exec = ExecutionEngine::new(
        &engine,
        &llm,
        EngineConfig::default(),
        Constraints::error_only(0.0),
    );
    let result = exec.run(&query).await.unwrap();

    assert_eq!(result.error, 0.0);
    match result.bounds {
        Bounds::Aggregate(a) => {
            assert_eq!(a.bounds[0].lower, 0.0);
            assert_eq!(a.bounds[0].upper, 0.0);
        }
        Bounds::Retrieval(_) => panic!("COUNT(*) must classify as aggregate"),
    }
}

// Scenario 5: LIMIT 2 retrieval, always-TRUE stub -> at least 2 rows,
// the engine may stop once the lower bound (intersection size) reaches
// the limit rather than deciding every row.
#[tokio::test]
async fn scenario_5_limit_short_circuits() {
    let engine = five_cars().await;
    let catalog = Catalog::load(&engine).await.unwrap();
    let query = thalamusdb::parse_and_qualify(
        "SELECT * FROM cars c WHERE NLfilter(c.pic, 'a car') LIMIT 2",
        &catalog,
    )
    .unwrap();

    let llm = FixedDecision(true);
    let exec = ExecutionEngine::new(
        &engine,
        &llm,
        EngineConfig {
            batch_size: 1,
            ..EngineConfig::default()
        },
        Constraints::error_only(0.0),
    );
    let result = exec.run(&query).await.unwrap();

    assert!(result.best_guess_rows().len() >= 2);
    assert!(result.counters.llm_calls <= 5);
}

// Scenario 6: two unary predicates and one join predicate, self-join
// over the same base table with two distinct aliases.
#[tokio::test]
async fn scenario_6_parses_two_unary_and_one_join() {
    let engine = five_cars().await;
    let catalog = Catalog::load(&engine).await.unwrap();
    let query = thalamusdb::parse_and_qualify(
        "SELECT * FROM cars c1, cars c2 \
         WHERE NLfilter(c1.pic, 'red') AND NLfilter(c2.pic, 'blue') \
         AND NLjoin(c1.pic, c2.pic, 'similar')",
        &catalog,
    )
    .unwrap();

    let unary_count = query
        .predicates
        .iter()
        .filter(|p| matches!(p, thalamusdb::query::Predicate::Unary { .. }))
        .count();
    let join_count = query
        .predicates
        .iter()
        .filter(|p| matches!(p, thalamusdb::query::Predicate::Join { .. }))
        .count();
    assert_eq!(unary_count, 2);
    assert_eq!(join_count, 1);

    assert_eq!(query.table_for_alias("c1"), Some("cars"));
    assert_eq!(query.table_for_alias("c2"), Some("cars"));
}
