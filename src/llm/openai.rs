//! OpenAI-compatible chat completion classifier, grounded on the
//! teacher codebase's `call_openai`, with a `logit_bias` restricting
//! the decision to the "0"/"1" tokens matching
//! `tdb/operators/semantic_filter.py`'s `logit_bias={15: 100, 16: 100}`.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::{parse_decision, Classification, Item, LlmClient, LlmConfig, LlmError};

pub struct OpenAiClient {
    http: Client,
    config: LlmConfig,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }
}

#[derive(Serialize)]
struct Request {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    logit_bias: HashMap<String, i32>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: Json,
}

#[derive(Deserialize)]
struct Response {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

const SYSTEM_PROMPT: &str =
    "Answer with exactly one character: 1 if the item satisfies the condition, 0 otherwise.";

/// Token ids for the literal "0"/"1" single-character completions in
/// the GPT-4 family tokenizer, matching the original source's
/// `logit_bias`. Providers with a different vocabulary simply ignore
/// unknown ids rather than erroring.
const ZERO_TOKEN_ID: &str = "15";
const ONE_TOKEN_ID: &str = "16";

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn classify(&self, condition: &str, item: &Item) -> Result<Classification, LlmError> {
        let mut blocks = vec![serde_json::json!({
            "type": "text",
            "text": format!("Condition: {condition}")
        })];
        for (idx, part) in item.parts().into_iter().enumerate() {
            match part {
                Item::Text(text) => blocks.push(serde_json::json!({
                    "type": "text",
                    "text": format!("Item {}: {text}", idx + 1)
                })),
                Item::Image { mime, base64 } => blocks.push(serde_json::json!({
                    "type": "image_url",
                    "image_url": { "url": format!("data:{mime};base64,{base64}") }
                })),
                Item::Pair(..) => unreachable!("parts() never yields a nested Pair"),
            }
        }
        let user_content = Json::Array(blocks);

        let mut logit_bias = HashMap::new();
        logit_bias.insert(ZERO_TOKEN_ID.to_string(), 100);
        logit_bias.insert(ONE_TOKEN_ID.to_string(), 100);

        let request = Request {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens.max(1),
            temperature: 0.0,
            messages: vec![
                Message {
                    role: "system",
                    content: Json::String(SYSTEM_PROMPT.to_string()),
                },
                Message {
                    role: "user",
                    content: user_content,
                },
            ],
            logit_bias,
        };

        let response = self
            .http
            .post(&self.config.api_url)
            .header("authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Provider(format!("{status}: {body}")));
        }

        let parsed: Response = response.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .filter_map(|c| c.message.content)
            .collect::<Vec<_>>()
            .join("");

        let decision = parse_decision(&text)
            .ok_or_else(|| LlmError::UnparseableDecision(text.clone()))?;

        let (input_tokens, output_tokens) = parsed
            .usage
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or((0, 0));

        Ok(Classification {
            decision,
            input_tokens,
            output_tokens,
        })
    }
}
