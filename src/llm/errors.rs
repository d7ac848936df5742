//! LLM client errors (spec.md §7): transient failures are retried
//! inside the operator; permanent failures are surfaced.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("LLM response did not contain a parseable 0/1 decision: {0}")]
    UnparseableDecision(String),

    #[error("LLM provider returned an error: {0}")]
    Provider(String),

    #[error("missing configuration: {0}")]
    Config(String),
}

impl LlmError {
    /// Whether a retry is worth attempting (spec.md §4.2, §7). Transport
    /// errors and unparseable decisions are transient; misconfiguration
    /// and provider-side rejections are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, LlmError::Transport(_) | LlmError::UnparseableDecision(_))
    }
}
