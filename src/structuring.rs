//! LLM structuring - turns extracted text into a hierarchy document
//!
//! The model is asked for JSON only; replies wrapped in prose or code
//! fences are recovered by taking the outermost `{...}` span.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::document::HierarchyDocument;
use crate::{Error, Result};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const SYSTEM_PROMPT: &str = "You return JSON only, no Markdown or explanation.";

/// Produces a hierarchy document from unstructured text
#[async_trait]
pub trait Structurer: Send + Sync {
    async fn structure(&self, text: &str) -> Result<HierarchyDocument>;
}

/// OpenAI chat-completions message
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Structurer backed by an OpenAI-compatible chat-completions API
pub struct OpenAiStructurer {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiStructurer {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// User prompt asking for the `{Class, Topics}` shape
pub fn build_prompt(raw_text: &str) -> String {
    format!(
        r#"Return ONLY valid JSON in this form:
{{"Class": "<title>", "Topics": {{"<topic>": ["note1","note2"]}}}}

Convert this text into that structure:
{}"#,
        raw_text
    )
}

/// Parse a model reply into a validated document.
///
/// Tries the whole reply first, then the span from the first `{` to the
/// last `}`. Anything that still is not a valid document is an
/// [`Error::Structuring`] carrying the reply.
pub fn parse_structured_response(text: &str) -> Result<HierarchyDocument> {
    let text = text.trim();

    let value = serde_json::from_str::<Value>(text).or_else(|_| {
        let span = match (text.find('{'), text.rfind('}')) {
            (Some(start), Some(end)) if start < end => &text[start..=end],
            _ => {
                return Err(Error::Structuring {
                    message: "Model did not return valid JSON".into(),
                    raw: text.to_string(),
                })
            }
        };
        serde_json::from_str::<Value>(span).map_err(|e| Error::Structuring {
            message: format!("Model did not return valid JSON: {}", e),
            raw: text.to_string(),
        })
    })?;

    HierarchyDocument::from_value(&value).map_err(|e| Error::Structuring {
        message: format!("Model returned an unexpected document: {}", e),
        raw: text.to_string(),
    })
}

#[async_trait]
impl Structurer for OpenAiStructurer {
    async fn structure(&self, text: &str) -> Result<HierarchyDocument> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT.to_string() },
                ChatMessage { role: "user", content: build_prompt(text) },
            ],
            temperature: 0.0,
        };

        tracing::info!("Structuring {} chars of text with {}", text.len(), self.model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Structuring {
                message: format!("HTTP request failed: {}", e),
                raw: String::new(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Structuring {
                message: format!("API error {}", status),
                raw: body,
            });
        }

        let api_response: ChatResponse = response.json().await.map_err(|e| Error::Structuring {
            message: format!("Failed to parse response: {}", e),
            raw: String::new(),
        })?;

        let reply = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        parse_structured_response(&reply)
    }
}
