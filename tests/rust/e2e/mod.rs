//! End-to-end scenarios against a seeded `cars(pic TEXT)` table,
//! following the worked examples in spec.md §8: an all-true LLM stub,
//! an all-false stub, a LIMIT-bounded retrieval query that short-
//! circuits before every row is decided, and a query shaped with two
//! unary predicates plus one join predicate.

mod scenarios;
