//! Chat-completion backend abstraction

use async_trait::async_trait;
use serde::Serialize;

use fixbrain_types::Result;

/// One chat message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Named JSON Schema the model output must follow
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: serde_json::Value,
}

/// A single completion request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    /// Request schema-guided generation when set
    pub response_schema: Option<ResponseSchema>,
}

/// Sends a chat request and returns the model's raw text
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String>;
}
