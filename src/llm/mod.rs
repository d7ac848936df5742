//! The LLM classifier contract (spec.md §6) and two provider
//! implementations, grounded on the teacher codebase's
//! `clickgraph-client::llm` provider-detection pattern.

pub mod anthropic;
pub mod errors;
pub mod item;
pub mod openai;

use async_trait::async_trait;

pub use errors::LlmError;
pub use item::Item;

/// One LLM decision, plus the token usage that produced it
/// (spec.md §4.6 Counters).
#[derive(Debug, Clone, Copy)]
pub struct Classification {
    pub decision: bool,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Contract required of any LLM classifier backing ThalamusDB
/// (spec.md §6): deterministic (temperature 0, one decision token)
/// given the same condition and item.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn classify(&self, condition: &str, item: &Item) -> Result<Classification, LlmError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Anthropic,
    OpenAi,
}

/// Configuration loaded from environment variables, generalizing the
/// teacher's `CLICKGRAPH_LLM_*` pattern to `THALAMUSDB_LLM_*`
/// (SPEC_FULL.md §5.2).
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: String,
    pub model: String,
    pub api_url: String,
    pub max_tokens: u32,
}

impl LlmConfig {
    /// Returns `None` if no API key is configured for the selected
    /// provider — callers decide whether that's fatal.
    pub fn from_env() -> Option<Self> {
        let provider_str = std::env::var("THALAMUSDB_LLM_PROVIDER")
            .unwrap_or_default()
            .to_lowercase();

        let (provider, api_key, default_model, default_url) = match provider_str.as_str() {
            "openai" => {
                let key = std::env::var("OPENAI_API_KEY")
                    .or_else(|_| std::env::var("ANTHROPIC_API_KEY"))
                    .ok()?;
                (
                    LlmProvider::OpenAi,
                    key,
                    "gpt-4o-mini".to_string(),
                    "https://api.openai.com/v1/chat/completions".to_string(),
                )
            }
            _ => {
                let key = std::env::var("ANTHROPIC_API_KEY").ok()?;
                (
                    LlmProvider::Anthropic,
                    key,
                    "claude-haiku-4-20250514".to_string(),
                    "https://api.anthropic.com/v1/messages".to_string(),
                )
            }
        };

        if api_key.is_empty() {
            return None;
        }

        Some(Self {
            provider,
            api_key,
            model: std::env::var("THALAMUSDB_LLM_MODEL").unwrap_or(default_model),
            api_url: std::env::var("THALAMUSDB_LLM_API_URL").unwrap_or(default_url),
            max_tokens: std::env::var("THALAMUSDB_LLM_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
        })
    }

    /// Builds the client the configured provider selects.
    pub fn build_client(&self) -> Box<dyn LlmClient> {
        match self.provider {
            LlmProvider::Anthropic => Box::new(anthropic::AnthropicClient::new(self.clone())),
            LlmProvider::OpenAi => Box::new(openai::OpenAiClient::new(self.clone())),
        }
    }
}

/// Parses a single decision token into a bool, accepting `"0"`/`"1"`
/// and tolerating surrounding whitespace or punctuation the model may
/// still emit despite logit-bias restriction (spec.md §4.2).
pub(crate) fn parse_decision(text: &str) -> Option<bool> {
    let trimmed = text.trim();
    match trimmed.chars().find(|c| *c == '0' || *c == '1') {
        Some('1') => Some(true),
        Some('0') => Some(false),
        _ => None,
    }
}
