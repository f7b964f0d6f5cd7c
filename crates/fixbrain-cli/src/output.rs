//! Output formatting module

use fixbrain_types::{OutputFormat, Result, TaskResult};

pub fn output_result(output_format: OutputFormat, result: &TaskResult) -> Result<()> {
    if output_format == OutputFormat::Json {
        let content = serde_json::to_string_pretty(result)?;
        println!("{}", content);
    } else {
        print!("{}", render_table(result));
    }

    Ok(())
}

pub fn output_task_ids(output_format: OutputFormat, ids: &[String]) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(ids)?);
    } else if ids.is_empty() {
        println!("No stored results.");
    } else {
        for id in ids {
            println!("{}", id);
        }
    }

    Ok(())
}

fn render_table(result: &TaskResult) -> String {
    let llm = &result.llm_result;
    let mut out = String::new();

    out.push_str("\nDiagnosis Result\n");
    out.push_str("================\n");
    out.push_str(&format!("Task:            {}\n", result.task_id));
    out.push_str(&format!("Appliance:       {}\n", result.appliance_type));
    out.push_str(&format!("Problem:         {}\n", result.problem_description));
    out.push_str(&format!("Decision:        {}\n", llm.decision.as_str().to_uppercase()));
    out.push_str(&format!("Image:           {}\n", result.image_path));
    out.push_str(&format!(
        "Analyzed at:     {}\n",
        result.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if !llm.root_causes.is_empty() {
        out.push_str("\n--- Root Causes ---\n");
        for (i, cause) in llm.root_causes.iter().enumerate() {
            out.push_str(&format!(
                "{:>2}. {} ({:.0}%)\n",
                i + 1,
                cause.name,
                cause.likelihood * 100.0
            ));
            for evidence in &cause.evidence {
                out.push_str(&format!("      - {}\n", evidence));
            }
        }
    }

    if let Some(ref plan) = llm.repair {
        out.push_str("\n--- Repair Plan ---\n");
        out.push_str(&format!("Difficulty:      {}/5\n", plan.difficulty));
        out.push_str(&format!("Estimated time:  {} min\n", plan.estimated_time_minutes));
        if !plan.tools.is_empty() {
            out.push_str(&format!("Tools:           {}\n", plan.tools.join(", ")));
        }
        if !plan.parts.is_empty() {
            out.push_str("Parts:\n");
            for part in &plan.parts {
                let marker = if part.critical { " (critical)" } else { "" };
                if part.description.is_empty() {
                    out.push_str(&format!("  - {}{}\n", part.name, marker));
                } else {
                    out.push_str(&format!("  - {}: {}{}\n", part.name, part.description, marker));
                }
            }
        }
        if !plan.steps.is_empty() {
            out.push_str("Steps:\n");
            for (i, step) in plan.steps.iter().enumerate() {
                out.push_str(&format!("{:>3}. {}\n", i + 1, step));
            }
        }
    }

    out.push_str("\nRationale:\n");
    out.push_str(&llm.rationale);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fixbrain_types::{Decision, DecisionResult, RepairPart, RepairPlan, RootCause, SceneDescription};

    #[test]
    fn test_render_table() {
        let result = TaskResult {
            task_id: "dryer-7".to_string(),
            appliance_type: "dryer".to_string(),
            problem_description: "squeals".to_string(),
            image_path: "data/images/abc.jpg".to_string(),
            image_sha256: String::new(),
            scene: SceneDescription {
                appliance: "dryer".to_string(),
                objects: Vec::new(),
                notes: Vec::new(),
            },
            llm_result: DecisionResult {
                decision: Decision::Repair,
                rationale: "Cheap belt swap".to_string(),
                root_causes: vec![RootCause {
                    name: "Worn belt".to_string(),
                    likelihood: 0.6,
                    evidence: vec!["squealing".to_string()],
                }],
                repair: Some(RepairPlan {
                    difficulty: 3,
                    estimated_time_minutes: 45,
                    tools: vec!["Phillips screwdriver".to_string()],
                    parts: vec![RepairPart {
                        name: "belt".to_string(),
                        description: String::new(),
                        critical: true,
                    }],
                    steps: vec!["Open panel".to_string(), "Swap belt".to_string()],
                }),
            },
            analyzed_at: Utc::now(),
        };

        let table = render_table(&result);
        assert!(table.contains("Decision:        REPAIR"));
        assert!(table.contains(" 1. Worn belt (60%)"));
        assert!(table.contains("  - belt (critical)"));
        assert!(table.contains("  2. Swap belt"));
        assert!(table.ends_with("Cheap belt swap\n"));
    }
}
