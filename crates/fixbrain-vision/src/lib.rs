//! Vision module - perception and LLM-based diagnosis of appliance problems

pub mod ai;
pub mod perception;

// Re-export main types for convenience
pub use ai::backend::{ChatMessage, ChatRequest, LlmBackend, ResponseSchema};
pub use ai::openai::{OpenAiBackend, OpenAiConfig};
pub use ai::prompts::{build_prompt, diagnosis_json_schema, SYSTEM_PROMPT};
pub use perception::{Perception, StubPerception};

use std::sync::Arc;

use fixbrain_domain::service::validate_diagnosis;
use fixbrain_types::{Diagnosis, Error, Result, SceneDescription};
use tracing::{info, warn};

/// Raw model text quoted in errors is cut to this many characters
const MAX_QUOTED_RESPONSE_CHARS: usize = 500;

/// Reasoning configuration
#[derive(Debug, Clone)]
pub struct ReasoningConfig {
    pub temperature: f32,
    /// Ask the backend for schema-guided output
    pub structured_output: bool,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            structured_output: true,
        }
    }
}

impl ReasoningConfig {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_structured_output(mut self, enabled: bool) -> Self {
        self.structured_output = enabled;
        self
    }
}

/// How the JSON object was obtained from the model text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// The whole response parsed as JSON
    Direct,
    /// Recovered from the span between the first `{` and the last `}`
    BraceScan,
}

/// Gateway from a problem report to a validated diagnosis
pub struct ReasoningGateway {
    backend: Arc<dyn LlmBackend>,
    config: ReasoningConfig,
}

impl ReasoningGateway {
    pub fn new(backend: Arc<dyn LlmBackend>, config: ReasoningConfig) -> Self {
        Self { backend, config }
    }

    /// Build the completion request for a problem report
    pub fn build_request(
        &self,
        appliance_type: &str,
        problem_description: &str,
        scene: &SceneDescription,
    ) -> ChatRequest {
        let prompt = build_prompt(appliance_type, problem_description, scene);
        let response_schema = self.config.structured_output.then(|| ResponseSchema {
            name: ai::prompts::DIAGNOSIS_SCHEMA_NAME.to_string(),
            schema: diagnosis_json_schema(),
        });

        ChatRequest {
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)],
            temperature: self.config.temperature,
            response_schema,
        }
    }

    /// Ask the model for root causes, a decision and a repair plan
    pub async fn diagnose(
        &self,
        appliance_type: &str,
        problem_description: &str,
        scene: &SceneDescription,
    ) -> Result<Diagnosis> {
        let request = self.build_request(appliance_type, problem_description, scene);
        let content = self.backend.complete(&request).await?;
        let diagnosis = parse_response(&content)?;

        info!(
            decision = %diagnosis.decision,
            root_causes = diagnosis.root_causes.len(),
            has_plan = diagnosis.repair.is_some(),
            "diagnosis received"
        );
        Ok(diagnosis)
    }
}

/// Parse model text into a validated diagnosis
pub fn parse_response(content: &str) -> Result<Diagnosis> {
    let (value, extraction) = extract_json_value(content)?;
    if extraction == Extraction::BraceScan {
        warn!("model response was not bare JSON; recovered object by brace scan (degraded)");
    }
    validate_diagnosis(value)
}

/// Locate and parse the JSON object in model text
///
/// Strict parse first; otherwise the substring from the first `{` to the last
/// `}` is parsed. Anything else is a malformed response.
pub fn extract_json_value(content: &str) -> Result<(serde_json::Value, Extraction)> {
    if let Ok(value) = serde_json::from_str(content) {
        return Ok((value, Extraction::Direct));
    }

    let candidate = extract_json_from_response(content).ok_or_else(|| malformed(content))?;
    serde_json::from_str(candidate)
        .map(|value| (value, Extraction::BraceScan))
        .map_err(|_| malformed(content))
}

/// Slice from the first `{` to the last `}` (handles markdown code blocks and prose)
pub fn extract_json_from_response(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (start < end).then(|| &response[start..=end])
}

fn malformed(content: &str) -> Error {
    let truncated: String = content.chars().take(MAX_QUOTED_RESPONSE_CHARS).collect();
    Error::MalformedResponse(truncated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixbrain_types::Decision;

    const BARE: &str = r#"{"root_causes": [{"name": "Clogged drain pump filter", "likelihood": 0.7, "evidence": ["standing water"]}], "decision": "repair", "rationale": "Filter is user-serviceable", "repair": {"difficulty": 2, "estimated_time_minutes": 30, "tools": ["towel"], "parts": [], "steps": ["Open filter hatch"]}}"#;

    #[test]
    fn test_extract_json_markdown() {
        let response = "```json\n{\"test\": 123}\n```";
        assert_eq!(extract_json_from_response(response), Some("{\"test\": 123}"));
    }

    #[test]
    fn test_extract_json_with_text() {
        let response = "Here is the result: {\"test\": 123} end";
        assert_eq!(extract_json_from_response(response), Some("{\"test\": 123}"));
    }

    #[test]
    fn test_extract_json_no_braces() {
        assert_eq!(extract_json_from_response("repair it"), None);
        assert_eq!(extract_json_from_response("} backwards {"), None);
    }

    #[test]
    fn test_fenced_matches_bare() {
        let fenced = format!("Sure! Here you go:\n```json\n{}\n```\nGood luck.", BARE);

        let (bare_value, bare_mode) = extract_json_value(BARE).unwrap();
        let (fenced_value, fenced_mode) = extract_json_value(&fenced).unwrap();

        assert_eq!(bare_mode, Extraction::Direct);
        assert_eq!(fenced_mode, Extraction::BraceScan);
        assert_eq!(bare_value, fenced_value);
        assert_eq!(parse_response(BARE).unwrap(), parse_response(&fenced).unwrap());
    }

    #[test]
    fn test_no_braces_is_malformed() {
        let err = parse_response("I think you should repair it.").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_broken_json_between_braces_is_malformed() {
        let err = parse_response("result: {\"decision\": repair} ").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_response_typed() {
        let diagnosis = parse_response(BARE).unwrap();
        assert_eq!(diagnosis.decision, Decision::Repair);
        assert_eq!(diagnosis.repair.unwrap().estimated_time_minutes, 30);
    }
}
