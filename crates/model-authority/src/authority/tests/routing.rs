use super::common::*;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use serde_json::json;
use tower::ServiceExt;

use crate::authority::history::MaiHistoryStore;
use crate::authority::router::{mai_handler, MaiRequest};

#[tokio::test]
async fn mai_route_scores_and_records() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/mai",
            &json!({ "brand": "acme", "breakdown": example_breakdown() }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["score"], json!(68.0));
    assert_eq!(payload["version"], json!("1.1.0"));
    assert_eq!(payload["breakdown"]["agentExecution"], json!(65.0));
}

#[tokio::test]
async fn mai_route_honours_requested_formula() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/mai",
            &json!({ "brand": "acme", "breakdown": example_breakdown(), "formula": "1.0.0" }),
        ))
        .await
        .expect("route executes");

    let payload = read_json_body(response).await;
    assert_eq!(payload["version"], json!("1.0.0"));
    assert_eq!(payload["score"], json!(73.0));
}

#[tokio::test]
async fn out_of_range_breakdown_is_rejected() {
    let (service, history, _) = build_service();
    let router = router_with_service(service);
    let mut breakdown = serde_json::to_value(example_breakdown()).expect("encode");
    breakdown["visibility"] = json!(140);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/mai",
            &json!({ "brand": "acme", "breakdown": breakdown }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("message")
        .contains("visibility"));
    assert!(history.all().expect("history").is_empty());
}

#[tokio::test]
async fn mai_handler_returns_internal_error_on_repository_failure() {
    let service = Arc::new(unavailable_service());

    let response = mai_handler(
        State(service),
        axum::Json(MaiRequest {
            brand: "acme".to_string(),
            breakdown: example_breakdown(),
            formula: None,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn basic_and_fallback_routes() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/mai/basic",
            &json!({
                "brand": "acme",
                "scores": {
                    "infrastructure": 80,
                    "visibility": 60,
                    "recommendation": 70,
                    "agentExecution": 65
                }
            }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["maiScore"], json!(68.25));
    assert_eq!(payload["subScores"]["agentExecution"], json!(65.0));

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/mai/fallback",
            &json!({ "brand": "acme", "geoScore": 57.4 }),
        ))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload["version"], json!("fallback"));
    assert_eq!(payload["score"], json!(57.0));

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/mai/fallback",
            &json!({ "brand": "acme", "geoScore": 101 }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = router
        .oneshot(get_request("/api/v1/mai/history"))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    let versions: Vec<&str> = payload
        .as_array()
        .expect("history array")
        .iter()
        .filter_map(|entry| entry["version"].as_str())
        .collect();
    assert_eq!(versions, vec!["basic", "fallback"]);
}

#[tokio::test]
async fn som_route_estimates_share() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/som",
            &json!({
                "brand": "Acme",
                "responses": ["Acme is great", "no mention here", "ACME wins"]
            }),
        ))
        .await
        .expect("route executes");

    let payload = read_json_body(response).await;
    assert_eq!(
        payload,
        json!({ "brand": "Acme", "share": 67, "mentions": 2, "totalMentions": 3 })
    );
}

#[tokio::test]
async fn audit_route_checks_the_site() {
    let site = axum::Router::new().route("/llm.txt", get(|| async { "hello agents" }));
    let addr = spawn_site(site).await;
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/protocols/audit",
            &json!({ "url": format!("http://{addr}") }),
        ))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(
        payload,
        json!({ "llmTxt": true, "aiPlugin": false, "mcpJson": false, "score": 35 })
    );

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/protocols/audit",
            &json!({ "url": "  " }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn benchmark_routes_record_and_serve_latest() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(get_request("/api/v1/benchmarks/latest"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/benchmarks",
            &json!({
                "industry": "saas",
                "entries": [
                    { "brand": "globex", "mai": 41, "som": 12 },
                    { "brand": "acme", "mai": 68, "som": 40 }
                ]
            }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .oneshot(get_request("/api/v1/benchmarks/latest"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["industry"], json!("saas"));
    assert_eq!(payload["entries"][0]["brand"], json!("acme"));
}

#[tokio::test]
async fn plan_certification_and_report_routes() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/action-plan",
            &json!({ "url": "https://acme.io" }),
        ))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload["high"].as_array().map(Vec::len), Some(3));
    assert_eq!(payload["low"], json!([]));

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/certification",
            &json!({ "brand": "Acme", "infrastructure": 70, "agentExecution": 61, "score": 66 }),
        ))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload["isEligible"], json!(false));
    assert_eq!(
        payload["rejectionReasons"],
        json!(["Infrastructure score must be > 70"])
    );

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/reports/executive",
            &json!({ "url": "https://globex.com/about" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["fileName"],
        json!("globex_LLM_Authority_Report_v1.0.pdf")
    );
    assert_eq!(payload["report"]["brand"], json!("globex"));
    assert!(payload["report"].get("benchmark").is_none());
}

#[tokio::test]
async fn prompts_route_lists_canonical_prompts() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(get_request("/api/v1/prompts"))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload["prompts"].as_array().map(Vec::len), Some(5));
    assert_eq!(payload["prompts"][0], json!("Best AI SEO tools"));

    let response = router
        .oneshot(get_request("/api/v1/prompts?niche=fintech"))
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload["niche"], json!("fintech"));
    assert_eq!(payload["templates"], json!([]));
}
