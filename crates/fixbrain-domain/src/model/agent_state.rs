//! Agent state tracking
//!
//! One `AgentState` per diagnosis run. The run walks the phases
//! observe → reason → decide → act exactly once; `iteration` stays 0.

use fixbrain_types::{Decision, Diagnosis, RepairPlan, RootCause, SceneDescription};

/// What the agent observes
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub image_path: String,
    pub appliance_type: String,
    pub problem_description: String,
    pub scene_description: SceneDescription,
}

/// Agent's reasoning about the problem
#[derive(Debug, Clone, PartialEq)]
pub struct Hypothesis {
    pub root_causes: Vec<RootCause>,
    pub decision: Decision,
    pub rationale: String,
    pub repair_plan: Option<RepairPlan>,
}

impl From<Diagnosis> for Hypothesis {
    fn from(diagnosis: Diagnosis) -> Self {
        Self {
            root_causes: diagnosis.root_causes,
            decision: diagnosis.decision,
            rationale: diagnosis.rationale,
            repair_plan: diagnosis.repair,
        }
    }
}

/// Step of the agent loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Observe,
    Reason,
    Decide,
    Act,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Observe => "observe",
            Phase::Reason => "reason",
            Phase::Decide => "decide",
            Phase::Act => "act",
        }
    }
}

/// Tracks the agent's decision-making state
#[derive(Debug, Clone)]
pub struct AgentState {
    pub task_id: String,
    pub phase: Phase,
    pub observation: Option<Observation>,
    pub hypothesis: Option<Hypothesis>,
    pub completed: bool,
    pub iteration: u32,
    pub max_iterations: u32,
}

impl AgentState {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            phase: Phase::Observe,
            observation: None,
            hypothesis: None,
            completed: false,
            iteration: 0,
            max_iterations: 5,
        }
    }

    pub fn record_observation(&mut self, observation: Observation) {
        self.observation = Some(observation);
        self.phase = Phase::Reason;
    }

    pub fn record_hypothesis(&mut self, hypothesis: Hypothesis) {
        self.hypothesis = Some(hypothesis);
        self.phase = Phase::Decide;
    }

    pub fn complete(&mut self) {
        self.phase = Phase::Act;
        self.completed = true;
    }
}
