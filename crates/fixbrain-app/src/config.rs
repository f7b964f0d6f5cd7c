//! Configuration management for fixbrain
//!
//! Built once at startup and passed to every component. Sources, lowest to
//! highest precedence: defaults, optional TOML file, environment variables.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use fixbrain_types::{ConfigError, Result};
use fixbrain_vision::{OpenAiConfig, ReasoningConfig};
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// API key for the LLM provider
    #[serde(default)]
    pub openai_api_key: String,

    /// Base directory for images/ and tasks/
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// OpenAI-compatible API root
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Request schema-guided output from the model
    #[serde(default = "default_true")]
    pub structured_output: bool,

    /// HTTP listen address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Maximum accepted request body in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_api_base_url() -> String {
    fixbrain_vision::ai::openai::DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_bind_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            data_dir: default_data_dir(),
            api_base_url: default_api_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout_secs(),
            structured_output: true,
            bind_addr: default_bind_addr(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }
        .into()
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }
        .into()),
    }
}

impl Config {
    /// Defaults overlaid with the process environment
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup` (environment-style keys)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().with_overrides(lookup)
    }

    /// Optional TOML file overlaid with the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_toml_str(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// Apply environment-style overrides
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("OPENAI_API_KEY") {
            self.openai_api_key = v;
        }
        if let Some(v) = lookup("DATA_DIR") {
            self.data_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("FIXBRAIN_API_BASE_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = lookup("FIXBRAIN_MODEL") {
            self.model = v;
        }
        if let Some(v) = lookup("FIXBRAIN_TEMPERATURE") {
            self.temperature = parse_value("FIXBRAIN_TEMPERATURE", &v)?;
        }
        if let Some(v) = lookup("FIXBRAIN_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_value("FIXBRAIN_REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("FIXBRAIN_STRUCTURED_OUTPUT") {
            self.structured_output = parse_bool("FIXBRAIN_STRUCTURED_OUTPUT", &v)?;
        }
        if let Some(v) = lookup("FIXBRAIN_BIND") {
            self.bind_addr = v;
        }
        if let Some(v) = lookup("FIXBRAIN_MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = parse_value("FIXBRAIN_MAX_UPLOAD_BYTES", &v)?;
        }
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn openai_config(&self) -> OpenAiConfig {
        OpenAiConfig {
            api_key: self.openai_api_key.clone(),
            base_url: self.api_base_url.clone(),
            model: self.model.clone(),
            timeout: self.request_timeout(),
        }
    }

    pub fn reasoning_config(&self) -> ReasoningConfig {
        ReasoningConfig::default()
            .with_temperature(self.temperature)
            .with_structured_output(self.structured_output)
    }

    fn masked_api_key(&self) -> String {
        if self.openai_api_key.is_empty() {
            "(not set)".to_string()
        } else {
            let tail: String = self
                .openai_api_key
                .chars()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("****{}", tail)
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("openai_api_key", &self.masked_api_key())
            .field("data_dir", &self.data_dir)
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("structured_output", &self.structured_output)
            .field("bind_addr", &self.bind_addr)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FixBrain Configuration")?;
        writeln!(f, "======================")?;
        writeln!(f)?;
        writeln!(f, "API key:           {}", self.masked_api_key())?;
        writeln!(f, "Data dir:          {}", self.data_dir.display())?;
        writeln!(f, "API base URL:      {}", self.api_base_url)?;
        writeln!(f, "Model:             {}", self.model)?;
        writeln!(f, "Temperature:       {}", self.temperature)?;
        writeln!(f, "Request timeout:   {}s", self.request_timeout_secs)?;
        writeln!(f, "Structured output: {}", self.structured_output)?;
        writeln!(f, "Bind address:      {}", self.bind_addr)?;
        writeln!(f, "Max upload:        {} bytes", self.max_upload_bytes)?;
        Ok(())
    }
}
