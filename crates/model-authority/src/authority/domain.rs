use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sub-scores feeding the authority index, each conceptually within 0..=100.
///
/// Ranges are not enforced here; inputs are validated where they enter the
/// system (see [`crate::authority::gateway`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubScoreSet {
    pub infrastructure: f64,
    pub visibility: f64,
    pub recommendation: f64,
    pub agent_execution: f64,
    pub protocol_compliance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub som: Option<f64>,
}

impl SubScoreSet {
    pub fn with_som(mut self, som: f64) -> Self {
        self.som = Some(som);
        self
    }

    /// Breakdown where every term carries the same value.
    pub fn uniform(value: f64) -> Self {
        Self {
            infrastructure: value,
            visibility: value,
            recommendation: value,
            agent_execution: value,
            protocol_compliance: value,
            som: None,
        }
    }
}

/// Input of the basic four-term index used when protocol and SOM context is absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedScore {
    pub infrastructure: f64,
    pub visibility: f64,
    pub recommendation: f64,
    pub agent_execution: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaiVersion {
    #[serde(rename = "1.0.0")]
    V1_0_0,
    #[serde(rename = "1.1.0")]
    V1_1_0,
    #[serde(rename = "fallback")]
    Fallback,
    #[serde(rename = "basic")]
    Basic,
}

impl MaiVersion {
    pub const fn label(self) -> &'static str {
        match self {
            Self::V1_0_0 => "1.0.0",
            Self::V1_1_0 => "1.1.0",
            Self::Fallback => "fallback",
            Self::Basic => "basic",
        }
    }
}

impl fmt::Display for MaiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Versioned index computed from a [`SubScoreSet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorityIndexResult {
    pub score: f64,
    pub version: MaiVersion,
    pub breakdown: SubScoreSet,
    pub calculated_at: DateTime<Utc>,
}

/// Result of the basic index for a named brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandMaiResult {
    pub brand: String,
    pub mai_score: f64,
    pub sub_scores: AggregatedScore,
    pub timestamp: DateTime<Utc>,
}

/// One line of the append-only MAI history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaiHistoryEntry {
    pub brand: String,
    pub score: f64,
    pub version: MaiVersion,
    pub calculated_at: DateTime<Utc>,
}

impl MaiHistoryEntry {
    pub fn from_index(brand: &str, result: &AuthorityIndexResult) -> Self {
        Self {
            brand: brand.to_string(),
            score: result.score,
            version: result.version,
            calculated_at: result.calculated_at,
        }
    }

    pub fn from_basic(result: &BrandMaiResult) -> Self {
        Self {
            brand: result.brand.clone(),
            score: result.mai_score,
            version: MaiVersion::Basic,
            calculated_at: result.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareOfModelResult {
    pub brand: String,
    pub share: u32,
    pub mentions: usize,
    /// Number of responses sampled.
    pub total_mentions: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolAuditResult {
    pub llm_txt: bool,
    pub ai_plugin: bool,
    pub mcp_json: bool,
    pub score: u32,
}

impl ProtocolAuditResult {
    pub const LLM_TXT_POINTS: u32 = 35;
    pub const AI_PLUGIN_POINTS: u32 = 35;
    pub const MCP_JSON_POINTS: u32 = 30;

    pub fn from_checks(llm_txt: bool, ai_plugin: bool, mcp_json: bool) -> Self {
        let score = u32::from(llm_txt) * Self::LLM_TXT_POINTS
            + u32::from(ai_plugin) * Self::AI_PLUGIN_POINTS
            + u32::from(mcp_json) * Self::MCP_JSON_POINTS;

        Self {
            llm_txt,
            ai_plugin,
            mcp_json,
            score,
        }
    }
}

/// Brand scores handed to the benchmark aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkInput {
    pub brand: String,
    pub mai: f64,
    pub som: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkEntry {
    pub brand: String,
    pub mai: f64,
    pub som: f64,
    pub calculated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkSnapshot {
    pub industry: String,
    pub entries: Vec<BenchmarkEntry>,
    pub generated_at: DateTime<Utc>,
}

/// Composite outcome of one scan, consumed by the action plan and the report.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_audit: Option<ProtocolAuditResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub som: Option<ShareOfModelResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mai: Option<AuthorityIndexResult>,
}
