//! `JoinOperator` against a small cartesian product, exercising the
//! `Item::Pair` encoding path end to end (spec.md §3, §4.2).

use async_trait::async_trait;
use thalamusdb::engine_db::{RelationalEngine, SqliteEngine};
use thalamusdb::llm::{Classification, Item, LlmClient, LlmError};
use thalamusdb::operators::{JoinOperator, Operator};
use thalamusdb::{bounds, parse_and_qualify, Catalog};

/// Matches only when both sides share the same leading letter.
struct SameInitial;

#[async_trait]
impl LlmClient for SameInitial {
    async fn classify(&self, _condition: &str, item: &Item) -> Result<Classification, LlmError> {
        let decision = match item {
            Item::Pair(l, r) => match (l.as_ref(), r.as_ref()) {
                (Item::Text(a), Item::Text(b)) => {
                    a.chars().next() == b.chars().next()
                }
                _ => false,
            },
            _ => false,
        };
        Ok(Classification {
            decision,
            input_tokens: 8,
            output_tokens: 1,
        })
    }
}

async fn seeded_engine() -> SqliteEngine {
    let engine = SqliteEngine::in_memory().await.unwrap();
    engine
        .execute_ddl("CREATE TABLE evidence(face TEXT)")
        .await
        .unwrap();
    engine
        .execute_ddl("CREATE TABLE shopcams(face TEXT)")
        .await
        .unwrap();
    for face in ["alice", "bob"] {
        engine
            .execute_ddl(&format!("INSERT INTO evidence VALUES ('{face}')"))
            .await
            .unwrap();
    }
    for face in ["alan", "carla"] {
        engine
            .execute_ddl(&format!("INSERT INTO shopcams VALUES ('{face}')"))
            .await
            .unwrap();
    }
    engine
}

#[tokio::test]
async fn join_operator_decides_every_cartesian_pair() {
    let engine = seeded_engine().await;
    let catalog = Catalog::load(&engine).await.unwrap();
    let query = parse_and_qualify(
        "SELECT COUNT(*) FROM evidence e, shopcams s \
         WHERE NLjoin(e.face, s.face, 'same person')",
        &catalog,
    )
    .unwrap();

    let mut op = JoinOperator::new(query.predicates[0].clone(), &query);
    op.prepare(&engine).await.unwrap();
    let llm = SameInitial;

    let outcome = op.execute(10, None, &engine, &llm).await.unwrap();
    assert_eq!(outcome.rows_decided, 4);
    assert_eq!(op.counters().llm_calls, 4);

    let operators: Vec<Box<dyn Operator>> = vec![Box::new(op)];
    let bounds = bounds::compute(&query, &operators, &engine).await.unwrap();
    match bounds {
        thalamusdb::Bounds::Aggregate(a) => {
            assert_eq!(a.bounds[0].lower, 1.0);
            assert_eq!(a.bounds[0].upper, 1.0);
        }
        thalamusdb::Bounds::Retrieval(_) => panic!("COUNT(*) must classify as aggregate"),
    }
}
