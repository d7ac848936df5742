//! Integration tests driving the catalog, operator, rewriter and bound
//! computer together against an embedded SQLite engine, without going
//! through the full execution loop (see `e2e` for that).

mod join_operator_tests;
mod manual_round_tests;
