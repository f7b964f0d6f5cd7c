//! Error types for fixbrain

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No JSON object could be located in the model output
    #[error("LLM response is not valid JSON: {0}")]
    MalformedResponse(String),

    /// JSON was found but does not satisfy the diagnosis contract
    #[error("Invalid diagnosis: {0}")]
    InvalidDiagnosis(String),

    #[error("Upstream returned {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Invalid task id: {0:?}")]
    InvalidTaskId(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
