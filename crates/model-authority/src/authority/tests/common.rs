use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::authority::domain::{
    AuthorityIndexResult, BenchmarkSnapshot, MaiHistoryEntry, MaiVersion, ProtocolAuditResult,
    ScanResult, ShareOfModelResult, SubScoreSet,
};
use crate::authority::gateway::{GatewayAction, GatewayError, ModelGateway};
use crate::authority::history::{
    BenchmarkStore, InMemoryBenchmarkStore, InMemoryMaiHistoryStore, MaiHistoryStore,
    RepositoryError,
};
use crate::authority::service::{SourceError, SubScoreSource};
use crate::authority::{
    authority_router, AuthorityService, CertificationEvaluator, ProtocolAuditor,
};

pub(super) type MemoryService = AuthorityService<InMemoryMaiHistoryStore, InMemoryBenchmarkStore>;

pub(super) fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap()
}

/// Breakdown used throughout the product documentation; scores 68 under 1.1.0.
pub(super) fn example_breakdown() -> SubScoreSet {
    SubScoreSet {
        infrastructure: 80.0,
        visibility: 60.0,
        recommendation: 70.0,
        agent_execution: 65.0,
        protocol_compliance: 100.0,
        som: Some(40.0),
    }
}

pub(super) fn scan(url: &str) -> ScanResult {
    ScanResult {
        url: url.to_string(),
        ..ScanResult::default()
    }
}

pub(super) fn som(share: u32) -> ShareOfModelResult {
    ShareOfModelResult {
        brand: "acme".to_string(),
        share,
        mentions: 0,
        total_mentions: 0,
    }
}

pub(super) fn mai(score: f64, infrastructure: f64, visibility: f64) -> AuthorityIndexResult {
    AuthorityIndexResult {
        score,
        version: MaiVersion::V1_1_0,
        breakdown: SubScoreSet {
            infrastructure,
            visibility,
            ..example_breakdown()
        },
        calculated_at: fixed_time(),
    }
}

pub(super) fn audit(llm_txt: bool, ai_plugin: bool, mcp_json: bool) -> ProtocolAuditResult {
    ProtocolAuditResult::from_checks(llm_txt, ai_plugin, mcp_json)
}

pub(super) fn auditor() -> ProtocolAuditor {
    ProtocolAuditor::new(Duration::from_secs(2))
}

pub(super) fn build_service() -> (
    MemoryService,
    Arc<InMemoryMaiHistoryStore>,
    Arc<InMemoryBenchmarkStore>,
) {
    let history = Arc::new(InMemoryMaiHistoryStore::default());
    let benchmarks = Arc::new(InMemoryBenchmarkStore::default());
    let service = AuthorityService::new(
        history.clone(),
        benchmarks.clone(),
        auditor(),
        CertificationEvaluator::default(),
    );
    (service, history, benchmarks)
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    authority_router(Arc::new(service))
}

pub(super) struct UnavailableHistory;

impl MaiHistoryStore for UnavailableHistory {
    fn append(&self, _entry: MaiHistoryEntry) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }

    fn all(&self) -> Result<Vec<MaiHistoryEntry>, RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }

    fn clear(&self) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }
}

pub(super) struct UnavailableBenchmarks;

impl BenchmarkStore for UnavailableBenchmarks {
    fn append(&self, _snapshot: BenchmarkSnapshot) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }

    fn all(&self) -> Result<Vec<BenchmarkSnapshot>, RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }
}

pub(super) fn unavailable_service() -> AuthorityService<UnavailableHistory, UnavailableBenchmarks> {
    AuthorityService::new(
        Arc::new(UnavailableHistory),
        Arc::new(UnavailableBenchmarks),
        auditor(),
        CertificationEvaluator::default(),
    )
}

/// Sub-score source answering from a fixed table.
#[derive(Default)]
pub(super) struct FixedSource {
    pub(super) scores: HashMap<String, SubScoreSet>,
    pub(super) calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl FixedSource {
    pub(super) fn with(entries: &[(&str, SubScoreSet)]) -> Self {
        Self {
            scores: entries
                .iter()
                .map(|(brand, scores)| (brand.to_string(), *scores))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SubScoreSource for FixedSource {
    async fn sub_scores(
        &self,
        brand: &str,
        competitors: &[String],
    ) -> Result<SubScoreSet, SourceError> {
        self.calls
            .lock()
            .expect("source mutex poisoned")
            .push((brand.to_string(), competitors.to_vec()));
        self.scores
            .get(brand)
            .copied()
            .ok_or_else(|| SourceError::Missing(brand.to_string()))
    }
}

/// Gateway double that records requests and replays a canned answer.
pub(super) struct StubGateway {
    pub(super) answer: Value,
    pub(super) requests: Mutex<Vec<(GatewayAction, Value)>>,
}

impl StubGateway {
    pub(super) fn answering(answer: Value) -> Self {
        Self {
            answer,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ModelGateway for StubGateway {
    async fn invoke(&self, action: GatewayAction, payload: Value) -> Result<Value, GatewayError> {
        self.requests
            .lock()
            .expect("gateway mutex poisoned")
            .push((action, payload));
        Ok(self.answer.clone())
    }
}

/// Serves `router` on an ephemeral local port.
pub(super) async fn spawn_site(router: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve site");
    });
    addr
}

/// Address nothing is listening on.
pub(super) async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    addr
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn json_request(method: &str, uri: &str, body: &Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(body).expect("encode")))
        .expect("request")
}

pub(super) fn get_request(uri: &str) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::get(uri)
        .body(axum::body::Body::empty())
        .expect("request")
}
