//! OpenAI-compatible chat completion backend
//!
//! POST `{base_url}/chat/completions` with bearer auth. A single attempt per
//! request; the client timeout bounds the call.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::backend::{ChatMessage, ChatRequest, LlmBackend};
use fixbrain_types::{ConfigError, Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Upstream error bodies are cut to this many characters
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Connection settings for the OpenAI backend
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat<'a>>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

/// reqwest-based client for chat completions
pub struct OpenAiBackend {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey.into());
        }

        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// JSON body sent for `request`
    pub fn request_body(&self, request: &ChatRequest) -> Result<serde_json::Value> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: &request.messages,
            temperature: request.temperature,
            response_format: request.response_schema.as_ref().map(|s| ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: &s.name,
                    strict: true,
                    schema: &s.schema,
                },
            }),
        };
        Ok(serde_json::to_value(body)?)
    }
}

/// Pull the assistant text out of a completion response
fn extract_content(response: ChatCompletionResponse) -> Result<String> {
    let message = response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| Error::MalformedResponse("response contained no choices".to_string()))?;

    match (message.content, message.refusal) {
        (Some(content), _) if !content.trim().is_empty() => Ok(content),
        (_, Some(refusal)) => Err(Error::MalformedResponse(format!(
            "model refused: {}",
            refusal
        ))),
        _ => Err(Error::MalformedResponse(
            "response message has no content".to_string(),
        )),
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let body = self.request_body(request)?;
        debug!(model = %self.config.model, endpoint = %self.endpoint(), "sending chat completion");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::UpstreamStatus {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        extract_content(parsed)
    }
}
