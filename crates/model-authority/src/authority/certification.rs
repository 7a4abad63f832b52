use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{AuthorityIndexResult, BrandMaiResult};
use crate::config::DEFAULT_PUBLIC_BASE_URL;

/// Minimum scores a brand must strictly exceed to be certified AI-ready.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificationPolicy {
    pub min_infrastructure: f64,
    pub min_agent_execution: f64,
    pub min_score: f64,
    pub public_base_url: String,
}

impl Default for CertificationPolicy {
    fn default() -> Self {
        Self {
            min_infrastructure: 70.0,
            min_agent_execution: 60.0,
            min_score: 65.0,
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
        }
    }
}

/// The fields certification looks at, whichever index produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationCandidate {
    pub brand: String,
    pub infrastructure: f64,
    pub agent_execution: f64,
    pub score: f64,
}

impl CertificationCandidate {
    pub fn from_index(brand: &str, result: &AuthorityIndexResult) -> Self {
        Self {
            brand: brand.to_string(),
            infrastructure: result.breakdown.infrastructure,
            agent_execution: result.breakdown.agent_execution,
            score: result.score,
        }
    }
}

impl From<&BrandMaiResult> for CertificationCandidate {
    fn from(result: &BrandMaiResult) -> Self {
        Self {
            brand: result.brand.clone(),
            infrastructure: result.sub_scores.infrastructure,
            agent_execution: result.sub_scores.agent_execution,
            score: result.mai_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationResult {
    pub brand: String,
    pub is_eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reasons: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certified_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_json_url: Option<String>,
}

pub struct CertificationEvaluator {
    policy: CertificationPolicy,
}

impl CertificationEvaluator {
    pub fn new(policy: CertificationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &CertificationPolicy {
        &self.policy
    }

    pub fn evaluate(
        &self,
        candidate: &CertificationCandidate,
        evaluated_at: DateTime<Utc>,
    ) -> CertificationResult {
        let policy = &self.policy;
        let mut reasons = Vec::new();

        // Negated comparisons so a NaN score never clears a gate.

        if !(candidate.infrastructure > policy.min_infrastructure) {
            reasons.push(format!(
                "Infrastructure score must be > {}",
                policy.min_infrastructure
            ));
        }
        if !(candidate.agent_execution > policy.min_agent_execution) {
            reasons.push(format!(
                "Agent Execution score must be > {}",
                policy.min_agent_execution
            ));
        }
        if !(candidate.score > policy.min_score) {
            reasons.push(format!("Overall MAI Score must be > {}", policy.min_score));
        }

        if !reasons.is_empty() {
            return CertificationResult {
                brand: candidate.brand.clone(),
                is_eligible: false,
                rejection_reasons: Some(reasons),
                certified_date: None,
                badge_url: None,
                public_json_url: None,
            };
        }

        let slug = candidate.brand.to_lowercase();
        let base = policy.public_base_url.trim_end_matches('/');
        CertificationResult {
            brand: candidate.brand.clone(),
            is_eligible: true,
            rejection_reasons: None,
            certified_date: Some(evaluated_at),
            badge_url: Some(format!("{base}/badges/certified-{slug}.svg")),
            public_json_url: Some(format!("{base}/api/v1/certification/{slug}.json")),
        }
    }
}

impl Default for CertificationEvaluator {
    fn default() -> Self {
        Self::new(CertificationPolicy::default())
    }
}
