use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::certification::CertificationCandidate;
use super::domain::{AggregatedScore, BenchmarkInput, ScanResult, SubScoreSet};
use super::gateway::{validate_aggregated, validate_sub_scores, GatewayError};
use super::history::{BenchmarkStore, MaiHistoryStore};
use super::index::MaiFormula;
use super::plan::generate_plan;
use super::service::AuthorityService;
use super::som::estimate_share_with_aliases;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MaiRequest {
    pub brand: String,
    pub breakdown: SubScoreSet,
    #[serde(default)]
    pub formula: Option<MaiFormula>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BasicMaiRequest {
    pub brand: String,
    pub scores: AggregatedScore,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FallbackRequest {
    pub brand: String,
    #[serde(default)]
    pub breakdown: Option<SubScoreSet>,
    pub geo_score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SomRequest {
    pub brand: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub responses: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuditRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BenchmarkRequest {
    pub industry: String,
    pub entries: Vec<BenchmarkInput>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PromptQuery {
    pub niche: Option<String>,
}

/// Router exposing the scoring, audit and reporting endpoints.
pub fn authority_router<H, B>(service: Arc<AuthorityService<H, B>>) -> Router
where
    H: MaiHistoryStore + 'static,
    B: BenchmarkStore + 'static,
{
    Router::new()
        .route("/api/v1/mai", post(mai_handler::<H, B>))
        .route("/api/v1/mai/basic", post(basic_mai_handler::<H, B>))
        .route("/api/v1/mai/fallback", post(fallback_mai_handler::<H, B>))
        .route("/api/v1/mai/history", get(history_handler::<H, B>))
        .route("/api/v1/som", post(som_handler))
        .route("/api/v1/protocols/audit", post(audit_handler::<H, B>))
        .route("/api/v1/benchmarks", post(benchmark_handler::<H, B>))
        .route(
            "/api/v1/benchmarks/latest",
            get(latest_benchmark_handler::<H, B>),
        )
        .route("/api/v1/action-plan", post(action_plan_handler))
        .route("/api/v1/certification", post(certification_handler::<H, B>))
        .route("/api/v1/reports/executive", post(report_handler::<H, B>))
        .route("/api/v1/prompts", get(prompts_handler::<H, B>))
        .with_state(service)
}

pub(crate) async fn mai_handler<H, B>(
    State(service): State<Arc<AuthorityService<H, B>>>,
    Json(request): Json<MaiRequest>,
) -> Response
where
    H: MaiHistoryStore + 'static,
    B: BenchmarkStore + 'static,
{
    if let Err(err) = validate_sub_scores(&request.breakdown) {
        return invalid_input(err);
    }

    match service.score_breakdown(&request.brand, request.breakdown, request.formula) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => internal_error(err),
    }
}

pub(crate) async fn basic_mai_handler<H, B>(
    State(service): State<Arc<AuthorityService<H, B>>>,
    Json(request): Json<BasicMaiRequest>,
) -> Response
where
    H: MaiHistoryStore + 'static,
    B: BenchmarkStore + 'static,
{
    if let Err(err) = validate_aggregated(&request.scores) {
        return invalid_input(err);
    }

    match service.score_basic(&request.brand, request.scores) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => internal_error(err),
    }
}

pub(crate) async fn fallback_mai_handler<H, B>(
    State(service): State<Arc<AuthorityService<H, B>>>,
    Json(request): Json<FallbackRequest>,
) -> Response
where
    H: MaiHistoryStore + 'static,
    B: BenchmarkStore + 'static,
{
    if let Some(breakdown) = &request.breakdown {
        if let Err(err) = validate_sub_scores(breakdown) {
            return invalid_input(err);
        }
    }
    if !request.geo_score.is_finite() || !(0.0..=100.0).contains(&request.geo_score) {
        let payload = json!({ "error": "geoScore must be within 0..=100" });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    }

    match service.score_or_fallback(&request.brand, request.breakdown, request.geo_score) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => internal_error(err),
    }
}

pub(crate) async fn history_handler<H, B>(
    State(service): State<Arc<AuthorityService<H, B>>>,
) -> Response
where
    H: MaiHistoryStore + 'static,
    B: BenchmarkStore + 'static,
{
    match service.history() {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(err) => internal_error(err),
    }
}

pub(crate) async fn som_handler(Json(request): Json<SomRequest>) -> Response {
    let result =
        estimate_share_with_aliases(&request.brand, &request.aliases, &request.responses);
    (StatusCode::OK, Json(result)).into_response()
}

pub(crate) async fn audit_handler<H, B>(
    State(service): State<Arc<AuthorityService<H, B>>>,
    Json(request): Json<AuditRequest>,
) -> Response
where
    H: MaiHistoryStore + 'static,
    B: BenchmarkStore + 'static,
{
    if request.url.trim().is_empty() {
        let payload = json!({ "error": "url is required" });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    }

    let result = service.audit_protocols(&request.url).await;
    (StatusCode::OK, Json(result)).into_response()
}

pub(crate) async fn benchmark_handler<H, B>(
    State(service): State<Arc<AuthorityService<H, B>>>,
    Json(request): Json<BenchmarkRequest>,
) -> Response
where
    H: MaiHistoryStore + 'static,
    B: BenchmarkStore + 'static,
{
    match service.record_benchmark(&request.industry, request.entries) {
        Ok(snapshot) => (StatusCode::CREATED, Json(snapshot)).into_response(),
        Err(err) => internal_error(err),
    }
}

pub(crate) async fn latest_benchmark_handler<H, B>(
    State(service): State<Arc<AuthorityService<H, B>>>,
) -> Response
where
    H: MaiHistoryStore + 'static,
    B: BenchmarkStore + 'static,
{
    match service.latest_benchmark() {
        Ok(Some(snapshot)) => (StatusCode::OK, Json(snapshot)).into_response(),
        Ok(None) => {
            let payload = json!({ "error": "no benchmark recorded yet" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(err) => internal_error(err),
    }
}

pub(crate) async fn action_plan_handler(Json(scan): Json<ScanResult>) -> Response {
    (StatusCode::OK, Json(generate_plan(&scan))).into_response()
}

pub(crate) async fn certification_handler<H, B>(
    State(service): State<Arc<AuthorityService<H, B>>>,
    Json(candidate): Json<CertificationCandidate>,
) -> Response
where
    H: MaiHistoryStore + 'static,
    B: BenchmarkStore + 'static,
{
    (StatusCode::OK, Json(service.certify(&candidate))).into_response()
}

pub(crate) async fn report_handler<H, B>(
    State(service): State<Arc<AuthorityService<H, B>>>,
    Json(scan): Json<ScanResult>,
) -> Response
where
    H: MaiHistoryStore + 'static,
    B: BenchmarkStore + 'static,
{
    match service.executive_report(&scan) {
        Ok(report) => {
            let file_name = report.export_file_name();
            let payload = json!({ "fileName": file_name, "report": report });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => internal_error(err),
    }
}

pub(crate) async fn prompts_handler<H, B>(
    State(service): State<Arc<AuthorityService<H, B>>>,
    Query(query): Query<PromptQuery>,
) -> Response
where
    H: MaiHistoryStore + 'static,
    B: BenchmarkStore + 'static,
{
    let payload = match query.niche.as_deref().map(str::trim) {
        Some(niche) if !niche.is_empty() => {
            json!({ "niche": niche, "templates": service.niche_prompts(niche) })
        }
        _ => json!({ "prompts": service.default_prompts().prompts() }),
    };
    (StatusCode::OK, Json(payload)).into_response()
}

fn invalid_input(err: GatewayError) -> Response {
    let payload = json!({ "error": err.to_string() });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

fn internal_error(err: impl std::fmt::Display) -> Response {
    let payload = json!({ "error": err.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}
