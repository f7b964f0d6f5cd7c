//! Application service layer - configuration and the diagnosis agent

pub mod app;
pub mod config;
pub mod repository;

pub use app::{AgentError, DiagnosisAgent, DiagnosisRequest};
pub use config::Config;
