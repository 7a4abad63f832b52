use super::super::domain::ScanResult;
use super::{ActionPlan, Priority};

pub(crate) const SOM_HIGH_PRIORITY_BELOW: f64 = 30.0;
pub(crate) const SOM_MEDIUM_PRIORITY_BELOW: f64 = 50.0;
pub(crate) const INFRASTRUCTURE_FLOOR: f64 = 20.0;
pub(crate) const VISIBILITY_FLOOR: f64 = 15.0;
pub(crate) const MAINTAIN_ABOVE: f64 = 80.0;
pub(crate) const OVERHAUL_BELOW: f64 = 50.0;

/// Applies every rule in order; each rule files at most one recommendation.
pub(crate) fn classify(scan: &ScanResult) -> ActionPlan {
    let mut plan = ActionPlan::default();

    if let Some(audit) = &scan.protocol_audit {
        if !audit.llm_txt {
            plan.push(Priority::High, "Implement /llm.txt for AI crawlability");
        }
        if !audit.ai_plugin {
            plan.push(Priority::High, "Deploy ai-plugin.json manifest");
        }
        if !audit.mcp_json {
            plan.push(
                Priority::Medium,
                "Consider exposing an MCP (Model Context Protocol) connection endpoint",
            );
        }
    }

    let share = scan.som.as_ref().map(|som| f64::from(som.share)).unwrap_or(0.0);
    if share < SOM_HIGH_PRIORITY_BELOW {
        plan.push(
            Priority::High,
            "Increase brand mention frequency in niche prompts to improve Domination %",
        );
    } else if share < SOM_MEDIUM_PRIORITY_BELOW {
        plan.push(
            Priority::Medium,
            "Expand entity co-occurrence strategies in broad semantic topics",
        );
    } else {
        plan.push(
            Priority::Low,
            "Excellent Share of Model (Market Dominance). Maintain contextual content pace.",
        );
    }

    let breakdown = scan.mai.as_ref().map(|mai| &mai.breakdown);

    let infrastructure = breakdown.map(|b| b.infrastructure).unwrap_or(0.0);
    if infrastructure < INFRASTRUCTURE_FLOOR {
        plan.push(
            Priority::High,
            "Urgent: Optimize semantic HTML and structured data for better machine reading speed",
        );
    }

    let visibility = breakdown.map(|b| b.visibility).unwrap_or(0.0);
    if visibility < VISIBILITY_FLOOR {
        plan.push(
            Priority::Medium,
            "Improve general web footprint and citation velocity across high-authority sources",
        );
    }

    let score = scan.mai.as_ref().map(|mai| mai.score).unwrap_or(0.0);
    if score > MAINTAIN_ABOVE {
        plan.push(
            Priority::Low,
            "Maintain authority positioning and monitor emerging competitors closely",
        );
    } else if score < OVERHAUL_BELOW {
        plan.push(
            Priority::High,
            "Complete overhaul of AI-readiness needed to climb out of 'Low Authority' tier",
        );
    }

    plan
}
