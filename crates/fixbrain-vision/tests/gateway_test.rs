//! ReasoningGateway against a scripted backend

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fixbrain_types::{Decision, Error, Result};
use fixbrain_vision::{
    ChatRequest, LlmBackend, Perception, ReasoningConfig, ReasoningGateway, StubPerception,
    SYSTEM_PROMPT,
};
use std::path::Path;

/// Replies with a fixed text and remembers the last request
struct ScriptedBackend {
    reply: String,
    last_request: Mutex<Option<ChatRequest>>,
}

impl ScriptedBackend {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            last_request: Mutex::new(None),
        })
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        *self.last_request.lock().unwrap() = Some(request.clone());
        Ok(self.reply.clone())
    }
}

const REPLY: &str = r#"```json
{
  "root_causes": [{"name": "Failed defrost heater", "likelihood": 0.6, "evidence": ["frost on evaporator"]}],
  "decision": "repair",
  "rationale": "Heater is an inexpensive part",
  "repair": null
}
```"#;

#[tokio::test]
async fn test_diagnose_sends_system_and_user_messages() {
    let backend = ScriptedBackend::new(REPLY);
    let gateway = ReasoningGateway::new(backend.clone(), ReasoningConfig::default());
    let scene = StubPerception
        .analyze(Path::new("unused.jpg"), "refrigerator")
        .unwrap();

    let diagnosis = gateway
        .diagnose("refrigerator", "Excessive frost buildup", &scene)
        .await
        .unwrap();

    assert_eq!(diagnosis.decision, Decision::Repair);
    assert_eq!(diagnosis.root_causes[0].name, "Failed defrost heater");

    let request = backend.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.messages[0].role, "system");
    assert_eq!(request.messages[0].content, SYSTEM_PROMPT);
    assert!(request.messages[1].content.contains("Excessive frost buildup"));
    assert!((request.temperature - 0.2).abs() < f32::EPSILON);
    assert!(request.response_schema.is_some());
}

#[tokio::test]
async fn test_structured_output_can_be_disabled() {
    let backend = ScriptedBackend::new(REPLY);
    let config = ReasoningConfig::default()
        .with_structured_output(false)
        .with_temperature(0.0);
    let gateway = ReasoningGateway::new(backend.clone(), config);
    let scene = StubPerception.analyze(Path::new("unused.jpg"), "dryer").unwrap();

    gateway.diagnose("dryer", "No heat", &scene).await.unwrap();

    let request = backend.last_request.lock().unwrap().clone().unwrap();
    assert!(request.response_schema.is_none());
    assert_eq!(request.temperature, 0.0);
}

#[tokio::test]
async fn test_diagnose_rejects_prose() {
    let backend = ScriptedBackend::new("Sorry, I cannot see the image.");
    let gateway = ReasoningGateway::new(backend, ReasoningConfig::default());
    let scene = StubPerception.analyze(Path::new("unused.jpg"), "oven").unwrap();

    let err = gateway.diagnose("oven", "Won't heat", &scene).await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse(_)));
}

#[tokio::test]
async fn test_diagnose_rejects_invalid_decision() {
    let backend = ScriptedBackend::new(r#"{"decision": "repair or replace", "rationale": "template copied"}"#);
    let gateway = ReasoningGateway::new(backend, ReasoningConfig::default());
    let scene = StubPerception.analyze(Path::new("unused.jpg"), "oven").unwrap();

    let err = gateway.diagnose("oven", "Won't heat", &scene).await.unwrap_err();
    assert!(matches!(err, Error::InvalidDiagnosis(_)));
}
