//! Decision step - applies business rules to the agent's hypothesis
//!
//! Only the pass-through policy exists today. Cost thresholds, tool
//! availability or safety rules would be further `DecisionPolicy` impls.

use crate::model::Hypothesis;
use fixbrain_types::DecisionResult;

/// Turns a hypothesis into the final decision returned to the caller
pub trait DecisionPolicy: Send + Sync {
    fn decide(&self, hypothesis: &Hypothesis) -> DecisionResult;
}

/// Relays the model's decision, rationale, causes and plan unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughPolicy;

impl DecisionPolicy for PassThroughPolicy {
    fn decide(&self, hypothesis: &Hypothesis) -> DecisionResult {
        DecisionResult {
            decision: hypothesis.decision,
            rationale: hypothesis.rationale.clone(),
            root_causes: hypothesis.root_causes.clone(),
            repair: hypothesis.repair_plan.clone(),
        }
    }
}
