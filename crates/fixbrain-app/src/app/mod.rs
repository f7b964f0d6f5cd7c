//! Use cases

pub mod diagnosis_agent;

pub use diagnosis_agent::{AgentError, DiagnosisAgent, DiagnosisRequest};
