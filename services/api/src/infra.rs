use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;
use model_authority::authority::{
    AuthorityService, BenchmarkInput, BenchmarkStore, CertificationEvaluator, CertificationPolicy,
    MaiFormula, MaiHistoryStore, PromptKind, PromptTemplate, ProtocolAuditor, SourceError,
    StaticPromptLibrary, SubScoreSet, SubScoreSource,
};
use model_authority::config::ScoringConfig;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) const API_TOKEN_PREFIX: &str = "sk_soma_";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Wires the stores into a service configured from `scoring`.
pub(crate) fn build_service<H, B>(
    scoring: &ScoringConfig,
    history: Arc<H>,
    benchmarks: Arc<B>,
) -> AuthorityService<H, B>
where
    H: MaiHistoryStore + 'static,
    B: BenchmarkStore + 'static,
{
    let certification = CertificationEvaluator::new(CertificationPolicy {
        public_base_url: scoring.public_base_url.clone(),
        ..CertificationPolicy::default()
    });

    AuthorityService::new(
        history,
        benchmarks,
        ProtocolAuditor::new(scoring.audit_timeout()),
        certification,
    )
    .with_prompt_library(Arc::new(demo_prompt_library()))
}

/// Accepts `Bearer sk_soma_<secret>` with a non-empty secret.
pub(crate) fn validate_token(header: Option<&str>) -> bool {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(|token| token.trim().strip_prefix(API_TOKEN_PREFIX))
        .is_some_and(|secret| !secret.is_empty())
}

pub(crate) fn parse_formula(raw: &str) -> Result<MaiFormula, String> {
    match raw.trim() {
        "1.0.0" | "v1.0.0" => Ok(MaiFormula::V1_0_0),
        "1.1.0" | "v1.1.0" => Ok(MaiFormula::V1_1_0),
        other => Err(format!("unknown formula '{other}' (expected 1.0.0 or 1.1.0)")),
    }
}

/// Parses `brand=mai:som` into a benchmark row.
pub(crate) fn parse_benchmark_entry(raw: &str) -> Result<BenchmarkInput, String> {
    let (brand, scores) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected brand=mai:som, got '{raw}'"))?;
    let (mai, som) = scores
        .split_once(':')
        .ok_or_else(|| format!("expected brand=mai:som, got '{raw}'"))?;

    let brand = brand.trim();
    if brand.is_empty() {
        return Err(format!("missing brand in '{raw}'"));
    }
    let mai = mai
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid MAI in '{raw}' ({err})"))?;
    let som = som
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid SOM in '{raw}' ({err})"))?;

    Ok(BenchmarkInput {
        brand: brand.to_string(),
        mai,
        som,
    })
}

pub(crate) fn demo_prompt_library() -> StaticPromptLibrary {
    let template = |id: &str, subcategory: &str, kind: PromptKind, weight: f64, text: &str| {
        PromptTemplate {
            id: id.to_string(),
            niche: "saas".to_string(),
            subcategory: subcategory.to_string(),
            kind,
            strategic_weight: weight,
            text: text.to_string(),
        }
    };

    StaticPromptLibrary::new(vec![
        template(
            "saas-1",
            "analytics",
            PromptKind::Informational,
            0.6,
            "What tools track brand visibility in AI answers?",
        ),
        template(
            "saas-2",
            "analytics",
            PromptKind::Comparative,
            0.9,
            "Which AI visibility platform is better for B2B SaaS teams?",
        ),
        template(
            "saas-3",
            "tooling",
            PromptKind::Transactional,
            0.4,
            "Where can I buy an LLM visibility audit?",
        ),
    ])
}

/// Deterministic sub-scores for the offline demo sector.
#[derive(Debug, Clone)]
pub(crate) struct DemoSubScoreSource {
    scores: HashMap<String, SubScoreSet>,
}

impl Default for DemoSubScoreSource {
    fn default() -> Self {
        let mut scores = HashMap::new();
        scores.insert(
            "acme".to_string(),
            SubScoreSet {
                infrastructure: 80.0,
                visibility: 60.0,
                recommendation: 70.0,
                agent_execution: 65.0,
                protocol_compliance: 100.0,
                som: Some(40.0),
            },
        );
        scores.insert(
            "globex".to_string(),
            SubScoreSet {
                infrastructure: 55.0,
                visibility: 72.0,
                recommendation: 48.0,
                agent_execution: 40.0,
                protocol_compliance: 35.0,
                som: Some(52.0),
            },
        );
        scores.insert(
            "initech".to_string(),
            SubScoreSet {
                infrastructure: 18.0,
                visibility: 12.0,
                recommendation: 20.0,
                agent_execution: 10.0,
                protocol_compliance: 0.0,
                som: None,
            },
        );
        Self { scores }
    }
}

impl DemoSubScoreSource {
    pub(crate) fn brands(&self) -> Vec<String> {
        let mut brands: Vec<String> = self.scores.keys().cloned().collect();
        brands.sort();
        brands
    }
}

#[async_trait]
impl SubScoreSource for DemoSubScoreSource {
    async fn sub_scores(
        &self,
        brand: &str,
        _competitors: &[String],
    ) -> Result<SubScoreSet, SourceError> {
        self.scores
            .get(&brand.to_lowercase())
            .copied()
            .ok_or_else(|| SourceError::Missing(brand.to_string()))
    }
}
