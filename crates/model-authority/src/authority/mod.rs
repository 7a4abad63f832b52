//! Brand authority scoring for generative-AI answer engines.
//!
//! Pure calculators (share of model, authority index, benchmark ranking,
//! action plans, certification) sit next to the I/O-bound pieces: the protocol
//! auditor, the agent simulator and the model gateway. [`AuthorityService`]
//! ties them to the append-only history logs and [`authority_router`] exposes
//! the whole thing over HTTP.

pub mod agent;
pub mod benchmark;
pub mod certification;
pub mod domain;
pub mod gateway;
pub mod history;
pub mod index;
pub mod plan;
pub mod prompts;
pub mod protocol;
pub mod report;
pub mod router;
pub mod service;
pub mod som;

#[cfg(test)]
mod tests;

pub use agent::{AgentAction, AgentSimulator, SimulationResult};
pub use benchmark::{build_benchmark, export_url};
pub use certification::{
    CertificationCandidate, CertificationEvaluator, CertificationPolicy, CertificationResult,
};
pub use domain::{
    AggregatedScore, AuthorityIndexResult, BenchmarkEntry, BenchmarkInput, BenchmarkSnapshot,
    BrandMaiResult, MaiHistoryEntry, MaiVersion, ProtocolAuditResult, ScanResult,
    ShareOfModelResult, SubScoreSet,
};
pub use gateway::{
    analyze_geo_readability, GatewayAction, GatewayError, GeoReadability, HttpModelGateway,
    ModelGateway, ModelSampling, SamplingRequest,
};
pub use history::{
    BenchmarkStore, InMemoryBenchmarkStore, InMemoryMaiHistoryStore, JsonFileBenchmarkStore,
    JsonFileMaiHistoryStore, MaiHistoryStore, RepositoryError,
};
pub use index::{
    brand_mai_basic, calculate_mai_basic, fallback_result, AuthorityIndexCalculator,
    FormulaWeights, MaiFormula,
};
pub use plan::{generate_plan, ActionPlan, Priority};
pub use prompts::{
    prompts_for_niche, PromptKind, PromptLibrary, PromptSet, PromptTemplate, StaticPromptLibrary,
};
pub use protocol::{normalize_base_url, ProtocolAuditor};
pub use report::{brand_from_url, build_executive_report, ExecutiveReport};
pub use router::authority_router;
pub use service::{
    AuthorityService, AuthorityServiceError, BrandBaseline, GatewaySubScoreSource,
    SectorBenchmarkReport, SourceError, SubScoreSource,
};
pub use som::{estimate_share, estimate_share_with_aliases};
