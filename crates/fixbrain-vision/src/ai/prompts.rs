//! Prompts for appliance diagnosis
//!
//! A single user prompt asks for root causes, a repair/replace decision and a
//! repair plan in one JSON object. The scene from perception is embedded as
//! pretty-printed JSON. User text is embedded verbatim (no escaping).

use fixbrain_types::SceneDescription;
use serde_json::json;

/// System message sent with every diagnosis request
pub const SYSTEM_PROMPT: &str = "You are a precise JSON-only responding assistant.";

/// Name of the response schema when schema-guided output is requested
pub const DIAGNOSIS_SCHEMA_NAME: &str = "appliance_diagnosis";

// ============================================================================
// Output contract (textual form embedded in the prompt)
// ============================================================================

const OUTPUT_SCHEMA: &str = r#"{
    "root_causes": [
        {
            "name": "string",
            "likelihood": 0.0,
            "evidence": ["string"]
        }
    ],
    "decision": "repair or replace",
    "rationale": "string",
    "repair": {
        "difficulty": 1,
        "estimated_time_minutes": 0,
        "tools": ["string"],
        "parts": [
            {
                "name": "string",
                "description": "string",
                "critical": true
            }
        ],
        "steps": ["string"]
    }
}"#;

// ============================================================================
// Prompt builder
// ============================================================================

/// Build the diagnosis prompt
pub fn build_prompt(
    appliance_type: &str,
    problem_description: &str,
    scene: &SceneDescription,
) -> String {
    let scene_json = serde_json::to_string_pretty(scene).unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"You are an expert home appliance repair technician and cost optimizer.

The user reports a problem:
- Appliance type: {appliance_type}
- Problem description: {problem_description}

You are given a structured scene description from a perception system:
```json
{scene_json}
```

Your tasks:

1. Propose 1–3 likely root causes for the problem.
2. For each root cause, estimate its likelihood between 0 and 1.
3. For each root cause, list brief evidence from the scene.
4. Decide whether it is better to REPAIR the appliance or REPLACE it, and explain why.
5. If repair seems viable, generate:
   - difficulty of repair (1 to 5, where 1 is trivial, 5 is expert-level)
   - estimated repair time in minutes
   - list of required tools (generic names, e.g., "Phillips screwdriver")
   - list of parts (generic names and short description)
   - a clear, numbered list of step-by-step instructions for the repair.

Important:
- If you recommend replacement, you may still propose a repair plan if there is a plausible but non-optimal repair.
- If you cannot determine something, make the best reasonable assumption based on typical appliance behavior.

Respond ONLY with valid JSON using this exact schema:
{output_schema}

Do not include any explanation outside of this JSON.
"#,
        appliance_type = appliance_type,
        problem_description = problem_description,
        scene_json = scene_json,
        output_schema = OUTPUT_SCHEMA,
    )
}

// ============================================================================
// Machine-readable schema for constrained generation
// ============================================================================

/// JSON Schema of the diagnosis object, in the strict subset accepted by
/// OpenAI structured outputs (all properties required, no extras).
pub fn diagnosis_json_schema() -> serde_json::Value {
    let string_list = json!({ "type": "array", "items": { "type": "string" } });

    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["root_causes", "decision", "rationale", "repair"],
        "properties": {
            "root_causes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["name", "likelihood", "evidence"],
                    "properties": {
                        "name": { "type": "string" },
                        "likelihood": { "type": "number" },
                        "evidence": string_list
                    }
                }
            },
            "decision": { "type": "string", "enum": ["repair", "replace"] },
            "rationale": { "type": "string" },
            "repair": {
                "anyOf": [
                    {
                        "type": "object",
                        "additionalProperties": false,
                        "required": ["difficulty", "estimated_time_minutes", "tools", "parts", "steps"],
                        "properties": {
                            "difficulty": { "type": "integer" },
                            "estimated_time_minutes": { "type": "integer" },
                            "tools": string_list,
                            "parts": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "additionalProperties": false,
                                    "required": ["name", "description", "critical"],
                                    "properties": {
                                        "name": { "type": "string" },
                                        "description": { "type": "string" },
                                        "critical": { "type": "boolean" }
                                    }
                                }
                            },
                            "steps": string_list
                        }
                    },
                    { "type": "null" }
                ]
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixbrain_types::DetectedObject;

    fn scene() -> SceneDescription {
        SceneDescription {
            appliance: "washing machine".to_string(),
            objects: vec![DetectedObject {
                label: "pipe".to_string(),
                confidence: 0.8,
                bbox: [100, 120, 200, 260],
            }],
            notes: vec!["placeholder".to_string()],
        }
    }

    #[test]
    fn test_prompt_embeds_inputs() {
        let prompt = build_prompt(
            "washing machine",
            "Water won't drain, standing water visible at bottom",
            &scene(),
        );

        assert!(prompt.contains("- Appliance type: washing machine"));
        assert!(prompt.contains("- Problem description: Water won't drain"));
        assert!(prompt.contains("\"label\": \"pipe\""));
        assert!(prompt.contains("```json\n{\n  \"appliance\": \"washing machine\""));
        assert!(prompt.contains("\"decision\": \"repair or replace\""));
        assert!(prompt.ends_with("Do not include any explanation outside of this JSON.\n"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = build_prompt("dishwasher", "Spray arm not rotating", &scene());
        let b = build_prompt("dishwasher", "Spray arm not rotating", &scene());
        assert_eq!(a, b);
    }

    #[test]
    fn test_schema_decision_enum() {
        let schema = diagnosis_json_schema();
        assert_eq!(
            schema["properties"]["decision"]["enum"],
            json!(["repair", "replace"])
        );
        assert_eq!(schema["additionalProperties"], json!(false));
    }
}
