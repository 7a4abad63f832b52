use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{
    AggregatedScore, AuthorityIndexResult, BrandMaiResult, MaiVersion, SubScoreSet,
};

/// Weight vector applied to a [`SubScoreSet`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormulaWeights {
    pub infrastructure: f64,
    pub visibility: f64,
    pub recommendation: f64,
    pub agent_execution: f64,
    pub protocol_compliance: f64,
    pub som: f64,
}

impl FormulaWeights {
    pub fn total(&self) -> f64 {
        self.infrastructure
            + self.visibility
            + self.recommendation
            + self.agent_execution
            + self.protocol_compliance
            + self.som
    }

    fn apply(&self, breakdown: &SubScoreSet) -> f64 {
        breakdown.infrastructure * self.infrastructure
            + breakdown.visibility * self.visibility
            + breakdown.recommendation * self.recommendation
            + breakdown.agent_execution * self.agent_execution
            + breakdown.protocol_compliance * self.protocol_compliance
            + breakdown.som.unwrap_or(0.0) * self.som
    }
}

/// Published index formulas, keyed by version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaiFormula {
    #[serde(rename = "1.0.0")]
    V1_0_0,
    #[serde(rename = "1.1.0")]
    V1_1_0,
}

impl MaiFormula {
    pub const fn ordered() -> [Self; 2] {
        [Self::V1_0_0, Self::V1_1_0]
    }

    pub const fn version(self) -> MaiVersion {
        match self {
            Self::V1_0_0 => MaiVersion::V1_0_0,
            Self::V1_1_0 => MaiVersion::V1_1_0,
        }
    }

    pub const fn weights(self) -> FormulaWeights {
        match self {
            Self::V1_0_0 => FormulaWeights {
                infrastructure: 0.30,
                visibility: 0.25,
                recommendation: 0.20,
                agent_execution: 0.15,
                protocol_compliance: 0.10,
                som: 0.0,
            },
            Self::V1_1_0 => FormulaWeights {
                infrastructure: 0.25,
                visibility: 0.20,
                recommendation: 0.15,
                agent_execution: 0.15,
                protocol_compliance: 0.10,
                som: 0.15,
            },
        }
    }

    /// v1.1.0 when a SOM value is present, v1.0.0 otherwise.
    pub fn for_breakdown(breakdown: &SubScoreSet) -> Self {
        if breakdown.som.is_some() {
            Self::V1_1_0
        } else {
            Self::V1_0_0
        }
    }
}

/// Stateless calculator for the Model Authority Index.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorityIndexCalculator;

impl AuthorityIndexCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Picks the formula from the breakdown and stamps the current time.
    pub fn calculate(&self, breakdown: SubScoreSet) -> AuthorityIndexResult {
        self.calculate_at(MaiFormula::for_breakdown(&breakdown), breakdown, Utc::now())
    }

    /// Applies an explicitly chosen formula. A missing SOM contributes zero.
    pub fn calculate_with(&self, formula: MaiFormula, breakdown: SubScoreSet) -> AuthorityIndexResult {
        self.calculate_at(formula, breakdown, Utc::now())
    }

    pub fn calculate_at(
        &self,
        formula: MaiFormula,
        breakdown: SubScoreSet,
        calculated_at: DateTime<Utc>,
    ) -> AuthorityIndexResult {
        let raw = formula.weights().apply(&breakdown);
        debug!(version = formula.version().label(), raw, "authority index calculated");

        AuthorityIndexResult {
            score: raw.round(),
            version: formula.version(),
            breakdown,
            calculated_at,
        }
    }

    /// Returns `primary` unless it is missing or scored zero, in which case the
    /// GEO readability score stands in for every term.
    pub fn resolve_or_fallback(
        &self,
        primary: Option<AuthorityIndexResult>,
        geo_score: f64,
        calculated_at: DateTime<Utc>,
    ) -> AuthorityIndexResult {
        match primary {
            Some(result) if result.score != 0.0 && !result.score.is_nan() => result,
            _ => {
                debug!(geo_score, "authority index unavailable, using geo fallback");
                fallback_result(geo_score, calculated_at)
            }
        }
    }
}

pub fn fallback_result(geo_score: f64, calculated_at: DateTime<Utc>) -> AuthorityIndexResult {
    AuthorityIndexResult {
        score: geo_score.round(),
        version: MaiVersion::Fallback,
        breakdown: SubScoreSet::uniform(geo_score),
        calculated_at,
    }
}

pub const BASIC_INFRASTRUCTURE_WEIGHT: f64 = 0.25;
pub const BASIC_VISIBILITY_WEIGHT: f64 = 0.35;
pub const BASIC_RECOMMENDATION_WEIGHT: f64 = 0.25;
pub const BASIC_AGENT_EXECUTION_WEIGHT: f64 = 0.15;

/// Four-term index kept to two decimal places.
pub fn calculate_mai_basic(scores: &AggregatedScore) -> f64 {
    let mai = scores.infrastructure * BASIC_INFRASTRUCTURE_WEIGHT
        + scores.visibility * BASIC_VISIBILITY_WEIGHT
        + scores.recommendation * BASIC_RECOMMENDATION_WEIGHT
        + scores.agent_execution * BASIC_AGENT_EXECUTION_WEIGHT;
    (mai * 100.0).round() / 100.0
}

pub fn brand_mai_basic(
    brand: &str,
    scores: AggregatedScore,
    timestamp: DateTime<Utc>,
) -> BrandMaiResult {
    BrandMaiResult {
        brand: brand.to_string(),
        mai_score: calculate_mai_basic(&scores),
        sub_scores: scores,
        timestamp,
    }
}
