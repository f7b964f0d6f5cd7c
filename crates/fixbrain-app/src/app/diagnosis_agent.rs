//! Diagnosis Agent - core use case for an appliance problem report
//!
//! The agent runs one fixed pass per task:
//! 1. OBSERVE - stage the uploaded image, run perception
//! 2. REASON  - ask the model for causes, decision and plan
//! 3. DECIDE  - apply the decision policy
//! 4. ACT     - assemble the result, commit image + result to disk
//!
//! Nothing becomes visible on disk until step 4 succeeds.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, info_span, Instrument};

use crate::config::Config;
use crate::repository::{open_image_store, open_task_store};
use fixbrain_domain::model::{AgentState, Hypothesis, Observation};
use fixbrain_domain::service::{DecisionPolicy, PassThroughPolicy};
use fixbrain_store::{validate_task_id, ImageStore, TaskStore, WriteBatch};
use fixbrain_types::{Error, Result, TaskResult};
use fixbrain_vision::{LlmBackend, OpenAiBackend, Perception, ReasoningGateway, StubPerception};

/// Errors from a diagnosis run, by the stage that failed
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Invalid request: {0}")]
    InvalidInput(#[source] Error),

    #[error("Perception failed: {0}")]
    Perception(#[source] Error),

    #[error("Reasoning failed: {0}")]
    Reasoning(#[source] Error),

    #[error("Storage failed: {0}")]
    Storage(#[source] Error),
}

impl AgentError {
    /// Underlying error
    pub fn inner(&self) -> &Error {
        match self {
            AgentError::InvalidInput(e)
            | AgentError::Perception(e)
            | AgentError::Reasoning(e)
            | AgentError::Storage(e) => e,
        }
    }

    pub fn into_inner(self) -> Error {
        match self {
            AgentError::InvalidInput(e)
            | AgentError::Perception(e)
            | AgentError::Reasoning(e)
            | AgentError::Storage(e) => e,
        }
    }
}

/// Run filesystem work on the blocking pool
async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(std::io::Error::from)?
}

/// Problem report for one task
#[derive(Debug, Clone, Copy)]
pub struct DiagnosisRequest<'a> {
    pub task_id: &'a str,
    pub appliance_type: &'a str,
    pub problem_description: &'a str,
    pub image_bytes: &'a [u8],
}

/// Agent that diagnoses appliance problems
pub struct DiagnosisAgent {
    perception: Box<dyn Perception>,
    reasoning: ReasoningGateway,
    policy: Box<dyn DecisionPolicy>,
    images: ImageStore,
    tasks: TaskStore,
}

impl DiagnosisAgent {
    pub fn new(
        perception: Box<dyn Perception>,
        reasoning: ReasoningGateway,
        policy: Box<dyn DecisionPolicy>,
        images: ImageStore,
        tasks: TaskStore,
    ) -> Self {
        Self {
            perception,
            reasoning,
            policy,
            images,
            tasks,
        }
    }

    /// Production wiring: stub perception, OpenAI backend, pass-through policy
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = OpenAiBackend::new(config.openai_config())?;
        Self::with_backend(config, Arc::new(backend))
    }

    /// Same as `from_config` with a caller-supplied model backend
    pub fn with_backend(config: &Config, backend: Arc<dyn LlmBackend>) -> Result<Self> {
        Ok(Self::new(
            Box::new(StubPerception),
            ReasoningGateway::new(backend, config.reasoning_config()),
            Box::new(PassThroughPolicy),
            open_image_store(config)?,
            open_task_store(config)?,
        ))
    }

    /// Run the full diagnosis for one task
    pub async fn run(&self, request: DiagnosisRequest<'_>) -> std::result::Result<TaskResult, AgentError> {
        let span = info_span!("diagnosis", task_id = %request.task_id);

        async {
            let outcome = self.run_inner(request).await;
            if let Err(ref e) = outcome {
                error!(error = %e, "diagnosis failed");
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run_inner(&self, request: DiagnosisRequest<'_>) -> std::result::Result<TaskResult, AgentError> {
        validate_task_id(request.task_id).map_err(AgentError::InvalidInput)?;

        let mut state = AgentState::new(request.task_id);
        info!(
            phase = state.phase.label(),
            appliance = request.appliance_type,
            image_bytes = request.image_bytes.len(),
            "starting diagnosis"
        );

        // 1. OBSERVE
        let images = self.images.clone();
        let image_bytes = request.image_bytes.to_vec();
        let staged_image = blocking(move || images.stage(&image_bytes))
            .await
            .map_err(AgentError::Storage)?;
        let image_path = staged_image.final_path().display().to_string();

        let scene = self
            .perception
            .analyze(staged_image.file.staged_path(), request.appliance_type)
            .map_err(AgentError::Perception)?;

        state.record_observation(Observation {
            image_path: image_path.clone(),
            appliance_type: request.appliance_type.to_string(),
            problem_description: request.problem_description.to_string(),
            scene_description: scene.clone(),
        });

        // 2. REASON
        info!(phase = state.phase.label(), "requesting diagnosis from model");
        let diagnosis = self
            .reasoning
            .diagnose(request.appliance_type, request.problem_description, &scene)
            .await
            .map_err(AgentError::Reasoning)?;
        let hypothesis = Hypothesis::from(diagnosis);

        // 3. DECIDE
        let decision = self.policy.decide(&hypothesis);
        state.record_hypothesis(hypothesis);

        // 4. ACT
        let result = TaskResult {
            task_id: request.task_id.to_string(),
            appliance_type: request.appliance_type.to_string(),
            problem_description: request.problem_description.to_string(),
            image_path,
            image_sha256: staged_image.sha256.clone(),
            scene,
            llm_result: decision,
            analyzed_at: Utc::now(),
        };

        let tasks = self.tasks.clone();
        let snapshot = result.clone();
        let image_file = staged_image.file;
        blocking(move || {
            let staged_result = tasks.stage(&snapshot)?;
            let mut batch = WriteBatch::new();
            batch.push(image_file);
            batch.push(staged_result);
            batch.commit()
        })
        .await
        .map_err(AgentError::Storage)?;

        state.complete();
        info!(
            phase = state.phase.label(),
            decision = %result.llm_result.decision,
            image = %result.image_path,
            "diagnosis complete"
        );

        Ok(result)
    }

    /// Load a previously stored result
    pub async fn load(&self, task_id: &str) -> Result<Option<TaskResult>> {
        let tasks = self.tasks.clone();
        let task_id = task_id.to_string();
        blocking(move || tasks.load(&task_id)).await
    }
}
