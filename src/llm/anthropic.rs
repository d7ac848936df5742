//! Anthropic Messages API classifier, grounded on the teacher
//! codebase's `call_anthropic` (`clickgraph-client/src/llm.rs`),
//! generalized from schema-discovery prompting to a single-token
//! boolean classification call.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{parse_decision, Classification, Item, LlmClient, LlmConfig, LlmError};

pub struct AnthropicClient {
    http: Client,
    config: LlmConfig,
}

impl AnthropicClient {
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
    system: String,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: Vec<Content>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Content {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: String,
    data: String,
}

#[derive(Deserialize)]
struct Response {
    content: Vec<ResponseBlock>,
    usage: Usage,
}

#[derive(Deserialize)]
struct ResponseBlock {
    text: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

const SYSTEM_PROMPT: &str =
    "Answer with exactly one character: 1 if the item satisfies the condition, 0 otherwise.";

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn classify(&self, condition: &str, item: &Item) -> Result<Classification, LlmError> {
        let mut content = vec![Content::Text {
            text: format!("Condition: {condition}"),
        }];
        for (idx, part) in item.parts().into_iter().enumerate() {
            match part {
                Item::Text(text) => content.push(Content::Text {
                    text: format!("Item {}: {text}", idx + 1),
                }),
                Item::Image { mime, base64 } => content.push(Content::Image {
                    source: ImageSource {
                        kind: "base64",
                        media_type: mime.clone(),
                        data: base64.clone(),
                    },
                }),
                Item::Pair(..) => unreachable!("parts() never yields a nested Pair"),
            }
        }

        let request = Request {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens.max(1),
            temperature: 0.0,
            system: SYSTEM_PROMPT.to_string(),
            messages: vec![Message {
                role: "user",
                content,
            }],
        };

        let response = self
            .http
            .post(&self.config.api_url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
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
            .content
            .into_iter()
            .filter_map(|b| b.text)
            .collect::<Vec<_>>()
            .join("");

        let decision = parse_decision(&text)
            .ok_or_else(|| LlmError::UnparseableDecision(text.clone()))?;

        Ok(Classification {
            decision,
            input_tokens: parsed.usage.input_tokens,
            output_tokens: parsed.usage.output_tokens,
        })
    }
}
