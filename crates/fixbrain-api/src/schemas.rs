//! Response bodies

use fixbrain_types::{Decision, RepairPlan, RootCause, TaskResult};
use serde::{Deserialize, Serialize};

/// Body of a successful analyze call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResult {
    pub decision: Decision,
    pub rationale: String,
    pub root_causes: Vec<RootCause>,
    pub repair: Option<RepairPlan>,
}

impl From<&TaskResult> for AnalyzeResult {
    fn from(result: &TaskResult) -> Self {
        let llm = &result.llm_result;
        Self {
            decision: llm.decision,
            rationale: llm.rationale.clone(),
            root_causes: llm.root_causes.clone(),
            repair: llm.repair.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}
