use crate::infra::{validate_token, AppState};
use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use model_authority::authority::{
    authority_router, AuthorityService, BenchmarkStore, MaiHistoryStore,
};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

pub(crate) fn with_authority_routes<H, B>(
    service: Arc<AuthorityService<H, B>>,
    require_api_token: bool,
) -> axum::Router
where
    H: MaiHistoryStore + 'static,
    B: BenchmarkStore + 'static,
{
    let mut api = authority_router(service);
    if require_api_token {
        api = api.route_layer(middleware::from_fn(require_bearer_token));
    }

    api.route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn require_bearer_token(request: Request, next: Next) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if validate_token(authorization) {
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "rejected request without a valid api token");
    let payload = json!({ "error": "missing or invalid api token" });
    (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::build_service;
    use axum::body::Body;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use model_authority::authority::{InMemoryBenchmarkStore, InMemoryMaiHistoryStore};
    use model_authority::config::ScoringConfig;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn app(require_api_token: bool) -> (axum::Router, AppState) {
        let service = build_service(
            &ScoringConfig::default(),
            Arc::new(InMemoryMaiHistoryStore::default()),
            Arc::new(InMemoryBenchmarkStore::default()),
        );
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        let router = with_authority_routes(Arc::new(service), require_api_token)
            .layer(Extension(state.clone()));
        (router, state)
    }

    fn get(uri: &str, token: Option<&str>) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::get(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).expect("request")
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn readiness_follows_the_flag() {
        let (router, state) = app(false);

        let response = router
            .clone()
            .oneshot(get("/ready", None))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.readiness.store(true, Ordering::Release);
        let response = router
            .oneshot(get("/ready", None))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_render_as_prometheus_text() {
        let (router, _) = app(false);

        let response = router
            .oneshot(get("/metrics", None))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).expect("content type"),
            "text/plain; version=0.0.4"
        );
    }

    #[tokio::test]
    async fn api_routes_require_a_token_when_configured() {
        let (router, _) = app(true);

        let response = router
            .clone()
            .oneshot(get("/api/v1/prompts", None))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router
            .clone()
            .oneshot(get("/api/v1/prompts", Some("sk_other_123")))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router
            .clone()
            .oneshot(get("/api/v1/prompts?niche=saas", Some("sk_soma_live_123")))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
            .await
            .expect("read body");
        let payload: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload["templates"][0]["id"], json!("saas-2"));

        let response = router
            .oneshot(get("/health", None))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn api_routes_are_open_by_default() {
        let (router, _) = app(false);

        let response = router
            .oneshot(get("/api/v1/mai/history", None))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
    }
}
