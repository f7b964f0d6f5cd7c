//! Boundary validation for model output
//!
//! The model is asked for a fixed JSON shape but nothing forces it to comply.
//! Everything the rest of the pipeline relies on is checked here:
//! - `decision` must be present and be `repair` or `replace`
//! - likelihoods are clamped into [0, 1]
//! - a response carrying no causes, no rationale and no plan is rejected

use fixbrain_types::{null_to_default, Decision, Diagnosis, Error, RepairPlan, Result, RootCause};
use serde::{de, Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::warn;

/// `null` and `{}` both mean the model gave no plan
fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<RepairPlan>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Map<String, Value>>::deserialize(deserializer)? {
        Some(fields) if !fields.is_empty() => serde_json::from_value(Value::Object(fields))
            .map(Some)
            .map_err(de::Error::custom),
        _ => Ok(None),
    }
}

/// Model output before validation
#[derive(Debug, Clone, Deserialize)]
pub struct RawDiagnosis {
    #[serde(default, deserialize_with = "null_to_default")]
    pub root_causes: Vec<RootCause>,
    #[serde(default)]
    pub decision: Option<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub rationale: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub repair: Option<RepairPlan>,
}

/// Validate an extracted JSON value against the diagnosis contract
pub fn validate_diagnosis(value: serde_json::Value) -> Result<Diagnosis> {
    let raw: RawDiagnosis =
        serde_json::from_value(value).map_err(|e| Error::InvalidDiagnosis(e.to_string()))?;
    raw.validate()
}

impl RawDiagnosis {
    pub fn validate(self) -> Result<Diagnosis> {
        let decision = match self.decision.as_deref() {
            None => return Err(Error::InvalidDiagnosis("missing decision".to_string())),
            Some(value) => Decision::parse(value).ok_or_else(|| {
                Error::InvalidDiagnosis(format!(
                    "decision must be \"repair\" or \"replace\", got {:?}",
                    value
                ))
            })?,
        };

        if self.root_causes.is_empty() && self.rationale.trim().is_empty() && self.repair.is_none()
        {
            return Err(Error::InvalidDiagnosis(
                "response has no root causes, rationale or repair plan".to_string(),
            ));
        }

        let root_causes = self
            .root_causes
            .into_iter()
            .map(clamp_likelihood)
            .collect();

        Ok(Diagnosis {
            root_causes,
            decision,
            rationale: self.rationale,
            repair: self.repair,
        })
    }
}

fn clamp_likelihood(mut cause: RootCause) -> RootCause {
    let original = cause.likelihood;
    let clamped = if original.is_nan() {
        0.0
    } else {
        original.clamp(0.0, 1.0)
    };
    // NaN compares unequal, so it is reported here as well
    if clamped != original {
        warn!(
            cause = %cause.name,
            likelihood = original,
            "likelihood outside [0, 1], clamped to {}",
            clamped
        );
        cause.likelihood = clamped;
    }
    cause
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_diagnosis() {
        let diagnosis = validate_diagnosis(json!({
            "root_causes": [{"name": "Clogged pump", "likelihood": 0.8, "evidence": ["standing water"]}],
            "decision": "repair",
            "rationale": "Pump filter can be cleaned",
            "repair": null
        }))
        .unwrap();

        assert_eq!(diagnosis.decision, Decision::Repair);
        assert_eq!(diagnosis.root_causes.len(), 1);
        assert!(diagnosis.repair.is_none());
    }

    #[test]
    fn test_rejects_unknown_decision() {
        let err = validate_diagnosis(json!({
            "decision": "maybe",
            "rationale": "unsure"
        }))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidDiagnosis(_)));
    }

    #[test]
    fn test_rejects_missing_decision() {
        let err = validate_diagnosis(json!({"rationale": "no verdict"})).unwrap_err();
        assert!(matches!(err, Error::InvalidDiagnosis(msg) if msg.contains("missing decision")));
    }

    #[test]
    fn test_clamps_likelihood() {
        let diagnosis = validate_diagnosis(json!({
            "root_causes": [
                {"name": "a", "likelihood": 1.4},
                {"name": "b", "likelihood": -0.2},
                {"name": "c", "likelihood": 0.35}
            ],
            "decision": "replace",
            "rationale": "old unit"
        }))
        .unwrap();

        let likelihoods: Vec<f64> = diagnosis.root_causes.iter().map(|c| c.likelihood).collect();
        assert_eq!(likelihoods, vec![1.0, 0.0, 0.35]);
    }

    #[test]
    fn test_rejects_empty_diagnosis() {
        let err = validate_diagnosis(json!({
            "root_causes": [],
            "decision": "replace",
            "rationale": "  ",
            "repair": null
        }))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidDiagnosis(_)));
    }

    #[test]
    fn test_replace_with_rationale_but_no_evidence_is_accepted() {
        let diagnosis = validate_diagnosis(json!({
            "decision": "replace",
            "rationale": "Repair cost exceeds unit value"
        }))
        .unwrap();
        assert_eq!(diagnosis.decision, Decision::Replace);
        assert!(diagnosis.root_causes.is_empty());
    }

    #[test]
    fn test_empty_repair_object_is_no_plan() {
        let diagnosis = validate_diagnosis(json!({
            "decision": "replace",
            "rationale": "old",
            "repair": {}
        }))
        .unwrap();
        assert!(diagnosis.repair.is_none());

        let err = validate_diagnosis(json!({
            "decision": "repair",
            "rationale": "",
            "repair": {}
        }))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidDiagnosis(_)));
    }

    #[test]
    fn test_whole_number_floats_in_repair_plan() {
        let diagnosis = validate_diagnosis(json!({
            "root_causes": [{"name": "Worn belt", "likelihood": 0.6}],
            "decision": "repair",
            "rationale": "Belt is cheap",
            "repair": {
                "difficulty": 2,
                "estimated_time_minutes": 30.0,
                "tools": ["Phillips screwdriver"],
                "steps": ["Remove panel", "Replace belt"]
            }
        }))
        .unwrap();

        let plan = diagnosis.repair.unwrap();
        assert_eq!(plan.difficulty, 2);
        assert_eq!(plan.estimated_time_minutes, 30);

        let err = validate_diagnosis(json!({
            "decision": "repair",
            "rationale": "Belt is cheap",
            "repair": {"estimated_time_minutes": 22.5}
        }))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidDiagnosis(_)));
    }

    #[test]
    fn test_null_fields_use_defaults() {
        let diagnosis = validate_diagnosis(json!({
            "root_causes": null,
            "decision": "replace",
            "rationale": "Compressor failed",
            "repair": null
        }))
        .unwrap();
        assert!(diagnosis.root_causes.is_empty());
        assert!(diagnosis.repair.is_none());
    }

    #[test]
    fn test_rejects_non_object() {
        let err = validate_diagnosis(json!(["repair"])).unwrap_err();
        assert!(matches!(err, Error::InvalidDiagnosis(_)));
    }
}
