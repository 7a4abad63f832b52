use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    AuthorityIndexResult, BenchmarkSnapshot, MaiHistoryEntry, ScanResult, ShareOfModelResult,
};
use super::plan::{generate_plan, ActionPlan};

/// Everything an executive export needs, assembled in one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveReport {
    pub brand: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mai: Option<AuthorityIndexResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub som: Option<ShareOfModelResult>,
    pub history: Vec<MaiHistoryEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<BenchmarkSnapshot>,
    pub action_plan: ActionPlan,
    pub generated_at: DateTime<Utc>,
}

pub fn build_executive_report(
    scan: &ScanResult,
    history: Vec<MaiHistoryEntry>,
    benchmark: Option<BenchmarkSnapshot>,
    generated_at: DateTime<Utc>,
) -> ExecutiveReport {
    ExecutiveReport {
        brand: brand_from_url(&scan.url),
        mai: scan.mai.clone(),
        som: scan.som.clone(),
        history,
        benchmark,
        action_plan: generate_plan(scan),
        generated_at,
    }
}

/// First host label of a scanned URL: `https://acme.io/x` becomes `acme`.
pub fn brand_from_url(url: &str) -> String {
    let without_scheme = url.replacen("https://", "", 1).replacen("http://", "", 1);
    without_scheme
        .split('.')
        .next()
        .unwrap_or_default()
        .to_string()
}

impl ExecutiveReport {
    /// File name used when the report is exported.
    pub fn export_file_name(&self) -> String {
        format!("{}_LLM_Authority_Report_v1.0.pdf", self.brand)
    }
}
