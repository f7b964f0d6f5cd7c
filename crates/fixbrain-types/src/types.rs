//! Core records passed between the pipeline stages

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

/// Deserialize null as default value
pub fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::deserialize(deserializer).map(|opt| opt.unwrap_or_default())
}

/// Deserialize a count that may arrive as `30` or `30.0`; fractions are rejected
fn whole_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value) {
        Ok(value as u32)
    } else {
        Err(de::Error::custom(format!(
            "expected a non-negative whole number, got {}",
            value
        )))
    }
}

fn default_difficulty() -> u32 {
    3
}

fn default_estimated_minutes() -> u32 {
    60
}

fn default_true() -> bool {
    true
}

/// Final recommendation for the appliance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Repair,
    Replace,
}

impl Decision {
    const ALL: [Decision; 2] = [Decision::Repair, Decision::Replace];

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Repair => "repair",
            Decision::Replace => "replace",
        }
    }

    /// Parse the wire form, ignoring case and surrounding whitespace
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(value))
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hypothesized failure mechanism
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootCause {
    pub name: String,
    /// Probability in [0, 1]
    pub likelihood: f64,
    #[serde(default, deserialize_with = "null_to_default")]
    pub evidence: Vec<String>,
}

/// Part required by a repair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairPart {
    pub name: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub description: String,
    #[serde(default = "default_true")]
    pub critical: bool,
}

/// Tools, parts and ordered steps needed to fix the diagnosed fault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairPlan {
    /// 1 (trivial) to 5 (expert)
    #[serde(default = "default_difficulty", deserialize_with = "whole_number")]
    pub difficulty: u32,
    #[serde(default = "default_estimated_minutes", deserialize_with = "whole_number")]
    pub estimated_time_minutes: u32,
    #[serde(default, deserialize_with = "null_to_default")]
    pub tools: Vec<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub parts: Vec<RepairPart>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub steps: Vec<String>,
}

/// Validated model output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub root_causes: Vec<RootCause>,
    pub decision: Decision,
    pub rationale: String,
    pub repair: Option<RepairPlan>,
}

/// Output of the decision step, persisted as `llm_result`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub decision: Decision,
    pub rationale: String,
    pub root_causes: Vec<RootCause>,
    pub repair: Option<RepairPlan>,
}

/// Object reported by the perception step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub label: String,
    pub confidence: f64,
    /// x1, y1, x2, y2 in pixels
    pub bbox: [u32; 4],
}

/// Structured perception output, opaque context for reasoning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub appliance: String,
    #[serde(default)]
    pub objects: Vec<DetectedObject>,
    #[serde(default)]
    pub notes: Vec<String>,
}

/// Full snapshot of one diagnosis run, stored as `tasks/<task_id>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: String,
    pub appliance_type: String,
    pub problem_description: String,
    pub image_path: String,
    /// SHA256 of the uploaded bytes
    #[serde(default)]
    pub image_sha256: String,
    pub scene: SceneDescription,
    pub llm_result: DecisionResult,
    pub analyzed_at: DateTime<Utc>,
}
