//! OpenAI chat-completions client.
//!
//! One request per call: no caching, no retry. Structured output uses the
//! `json_schema` response format in strict mode.

use kgflow_core::LlmConfig;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::{ExtractError, Result};
use crate::llm::{LlmClient, Message, ResponseSchema};

/// OpenAI LLM client implementing [`LlmClient`].
#[derive(Clone)]
pub struct OpenAiClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.into(),
            temperature: 0.0,
        }
    }

    /// Build from the `[llm]` config section, falling back to the
    /// `OPENAI_API_KEY` environment variable for the key.
    pub fn from_config(cfg: &LlmConfig) -> Result<Self> {
        let api_key = match &cfg.api_key {
            Some(key) if !key.is_empty() => key.clone(),
            _ => std::env::var("OPENAI_API_KEY").map_err(|_| {
                ExtractError::Config("llm.api_key is unset and OPENAI_API_KEY is not set".into())
            })?,
        };

        Ok(Self::new(api_key, cfg.model.clone())
            .with_base_url(cfg.base_url.clone())
            .with_temperature(cfg.temperature))
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The JSON body sent to `/chat/completions`.
    fn request_body(&self, messages: &[Message], schema: &ResponseSchema) -> serde_json::Value {
        json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": schema.name,
                    "strict": true,
                    "schema": schema.schema,
                },
            },
        })
    }
}

#[derive(Deserialize)]
struct ChatResponseRaw {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl LlmClient for OpenAiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate_structured(
        &self,
        messages: &[Message],
        schema: &ResponseSchema,
    ) -> Result<String> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.request_body(messages, schema))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenAI request failed");
                ExtractError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %body, "OpenAI API error");
            return Err(ExtractError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let raw: ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| ExtractError::Parse(e.to_string()))?;

        debug!(
            model = %self.model,
            duration_ms = start.elapsed().as_millis(),
            "OpenAI chat completion"
        );

        raw.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ExtractError::EmptyResponse)
    }
}
