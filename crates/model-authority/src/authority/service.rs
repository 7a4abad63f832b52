use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::benchmark::{build_benchmark, export_url};
use super::certification::{CertificationCandidate, CertificationEvaluator, CertificationResult};
use super::domain::{
    AggregatedScore, AuthorityIndexResult, BenchmarkInput, BenchmarkSnapshot, BrandMaiResult,
    MaiHistoryEntry, ProtocolAuditResult, ScanResult, SubScoreSet,
};
use super::gateway::{
    analyze_geo_readability, run_model_sampling, GatewayError, ModelGateway, SamplingRequest,
};
use super::history::{BenchmarkStore, MaiHistoryStore, RepositoryError};
use super::index::{brand_mai_basic, AuthorityIndexCalculator, MaiFormula};
use super::prompts::{
    prompts_for_niche, PromptLibrary, PromptSet, PromptTemplate, StaticPromptLibrary,
};
use super::protocol::ProtocolAuditor;
use super::report::{build_executive_report, ExecutiveReport};

/// Supplies the sub-scores of a brand, typically from recent scans or a live
/// sampling batch.
#[async_trait]
pub trait SubScoreSource: Send + Sync {
    async fn sub_scores(
        &self,
        brand: &str,
        competitors: &[String],
    ) -> Result<SubScoreSet, SourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("no sub-scores available for {0}")]
    Missing(String),
}

/// Infrastructure-side scores that sampling cannot observe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandBaseline {
    pub infrastructure: f64,
    pub agent_execution: f64,
    pub protocol_compliance: f64,
}

/// Combines stored infrastructure baselines with a live sampling batch.
pub struct GatewaySubScoreSource<G> {
    gateway: Arc<G>,
    baselines: HashMap<String, BrandBaseline>,
    models: Vec<String>,
    prompts: PromptSet,
}

impl<G: ModelGateway> GatewaySubScoreSource<G> {
    pub fn new(gateway: Arc<G>, baselines: HashMap<String, BrandBaseline>) -> Self {
        Self {
            gateway,
            baselines: baselines
                .into_iter()
                .map(|(brand, baseline)| (brand.to_lowercase(), baseline))
                .collect(),
            models: vec!["gpt-4o".to_string(), "claude-3-opus".to_string()],
            prompts: PromptSet::default_set(),
        }
    }
}

#[async_trait]
impl<G: ModelGateway> SubScoreSource for GatewaySubScoreSource<G> {
    async fn sub_scores(
        &self,
        brand: &str,
        competitors: &[String],
    ) -> Result<SubScoreSet, SourceError> {
        let baseline = self
            .baselines
            .get(&brand.to_lowercase())
            .copied()
            .ok_or_else(|| SourceError::Missing(brand.to_string()))?;

        let request = SamplingRequest {
            brand: brand.to_string(),
            prompts: self.prompts.prompts().iter().map(|p| p.to_string()).collect(),
            competitors: competitors.to_vec(),
            models: self.models.clone(),
            temperature: 0.3,
            context: "clean".to_string(),
        };
        let sampling = run_model_sampling(self.gateway.as_ref(), &request).await?;

        Ok(SubScoreSet {
            infrastructure: baseline.infrastructure,
            visibility: sampling.mention_frequency,
            recommendation: sampling.recommendation_rank,
            agent_execution: baseline.agent_execution,
            protocol_compliance: baseline.protocol_compliance,
            som: Some(sampling.share_of_model),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorBenchmarkReport {
    pub snapshot: BenchmarkSnapshot,
    pub export_url: String,
}

/// Service composing the index calculator, the history logs and reporting.
pub struct AuthorityService<H, B> {
    calculator: AuthorityIndexCalculator,
    history: Arc<H>,
    benchmarks: Arc<B>,
    auditor: ProtocolAuditor,
    certification: CertificationEvaluator,
    prompts: Arc<dyn PromptLibrary>,
    public_base_url: String,
}

impl<H, B> AuthorityService<H, B>
where
    H: MaiHistoryStore + 'static,
    B: BenchmarkStore + 'static,
{
    pub fn new(
        history: Arc<H>,
        benchmarks: Arc<B>,
        auditor: ProtocolAuditor,
        certification: CertificationEvaluator,
    ) -> Self {
        let public_base_url = certification.policy().public_base_url.clone();
        Self {
            calculator: AuthorityIndexCalculator::new(),
            history,
            benchmarks,
            auditor,
            certification,
            prompts: Arc::new(StaticPromptLibrary::default()),
            public_base_url,
        }
    }

    pub fn with_prompt_library(mut self, prompts: Arc<dyn PromptLibrary>) -> Self {
        self.prompts = prompts;
        self
    }

    /// Canonical sampling prompts.
    pub fn default_prompts(&self) -> PromptSet {
        PromptSet::default_set()
    }

    pub fn niche_prompts(&self, niche: &str) -> Vec<PromptTemplate> {
        prompts_for_niche(self.prompts.as_ref(), niche)
    }

    /// Calculate the index for a brand and append it to the history log.
    ///
    /// Without an explicit formula the version follows the presence of SOM.
    pub fn score_breakdown(
        &self,
        brand: &str,
        breakdown: SubScoreSet,
        formula: Option<MaiFormula>,
    ) -> Result<AuthorityIndexResult, AuthorityServiceError> {
        let formula = formula.unwrap_or_else(|| MaiFormula::for_breakdown(&breakdown));
        let result = self.calculator.calculate_at(formula, breakdown, Utc::now());
        self.history
            .append(MaiHistoryEntry::from_index(brand, &result))?;
        info!(%brand, score = result.score, version = %result.version, "authority index recorded");
        Ok(result)
    }

    /// Basic four-term index for a brand, appended to the history log.
    pub fn score_basic(
        &self,
        brand: &str,
        scores: AggregatedScore,
    ) -> Result<BrandMaiResult, AuthorityServiceError> {
        let result = brand_mai_basic(brand, scores, Utc::now());
        self.history.append(MaiHistoryEntry::from_basic(&result))?;
        info!(%brand, score = result.mai_score, "basic authority index recorded");
        Ok(result)
    }

    /// Full index when sub-scores are usable, GEO readability stand-in otherwise.
    pub fn score_or_fallback(
        &self,
        brand: &str,
        breakdown: Option<SubScoreSet>,
        geo_score: f64,
    ) -> Result<AuthorityIndexResult, AuthorityServiceError> {
        let now = Utc::now();
        let primary = breakdown.map(|breakdown| {
            self.calculator
                .calculate_at(MaiFormula::for_breakdown(&breakdown), breakdown, now)
        });
        let result = self.calculator.resolve_or_fallback(primary, geo_score, now);
        self.history
            .append(MaiHistoryEntry::from_index(brand, &result))?;
        Ok(result)
    }

    /// Grades the page through the gateway, then scores with that GEO
    /// readability as the fallback.
    pub async fn score_with_geo_readability<G>(
        &self,
        brand: &str,
        breakdown: Option<SubScoreSet>,
        url: &str,
        content: &str,
        gateway: &G,
    ) -> Result<AuthorityIndexResult, AuthorityServiceError>
    where
        G: ModelGateway + ?Sized,
    {
        let readability = analyze_geo_readability(gateway, url, content).await?;
        debug!(%brand, %url, geo_score = readability.score, "geo readability graded");
        self.score_or_fallback(brand, breakdown, readability.score)
    }

    pub async fn audit_protocols(&self, base_url: &str) -> ProtocolAuditResult {
        self.auditor.audit(base_url).await
    }

    /// Rank already-computed brand scores and append the snapshot.
    pub fn record_benchmark(
        &self,
        industry: &str,
        entries: Vec<BenchmarkInput>,
    ) -> Result<BenchmarkSnapshot, AuthorityServiceError> {
        let snapshot = build_benchmark(industry, entries, Utc::now());
        self.benchmarks.append(snapshot.clone())?;
        Ok(snapshot)
    }

    /// Score every brand of a sector through `source`, then rank and store them.
    pub async fn run_sector_benchmark<S>(
        &self,
        sector: &str,
        brands: &[String],
        source: &S,
    ) -> Result<SectorBenchmarkReport, AuthorityServiceError>
    where
        S: SubScoreSource + ?Sized,
    {
        let mut entries = Vec::with_capacity(brands.len());

        for brand in brands {
            let competitors: Vec<String> = brands
                .iter()
                .filter(|other| *other != brand)
                .cloned()
                .collect();

            let breakdown = source
                .sub_scores(brand, &competitors)
                .await
                .map_err(|err| AuthorityServiceError::Source {
                    brand: brand.clone(),
                    source: err,
                })?;

            let result = self.score_breakdown(brand, breakdown, None)?;
            entries.push(BenchmarkInput {
                brand: brand.clone(),
                mai: result.score,
                som: breakdown.som.unwrap_or(0.0),
            });
        }

        let snapshot = self.record_benchmark(sector, entries)?;
        let export_url = export_url(&self.public_base_url, sector, snapshot.generated_at);
        info!(%sector, brands = brands.len(), "sector benchmark recorded");

        Ok(SectorBenchmarkReport {
            snapshot,
            export_url,
        })
    }

    /// Report over the scan, the full history log and the latest benchmark.
    pub fn executive_report(&self, scan: &ScanResult) -> Result<ExecutiveReport, AuthorityServiceError> {
        let history = self.history.all()?;
        let benchmark = self.benchmarks.latest()?;
        if benchmark.is_none() {
            debug!(url = %scan.url, "no benchmark snapshot available for report");
        }
        Ok(build_executive_report(scan, history, benchmark, Utc::now()))
    }

    pub fn certify(&self, candidate: &CertificationCandidate) -> CertificationResult {
        self.certification.evaluate(candidate, Utc::now())
    }

    pub fn history(&self) -> Result<Vec<MaiHistoryEntry>, AuthorityServiceError> {
        Ok(self.history.all()?)
    }

    pub fn clear_history(&self) -> Result<(), AuthorityServiceError> {
        Ok(self.history.clear()?)
    }

    pub fn latest_benchmark(&self) -> Result<Option<BenchmarkSnapshot>, AuthorityServiceError> {
        Ok(self.benchmarks.latest()?)
    }
}

/// Error raised by the authority service.
#[derive(Debug, thiserror::Error)]
pub enum AuthorityServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("sub-scores unavailable for {brand}: {source}")]
    Source {
        brand: String,
        #[source]
        source: SourceError,
    },
}
