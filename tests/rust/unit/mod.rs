//! Unit tests exercising public API surface that spans more than one
//! module: parser robustness on malformed input, and rewriter/bounds
//! invariants that the inline `#[cfg(test)]` modules don't already
//! cover end to end.

mod parser_robustness_tests;
mod rewriter_invariant_tests;
