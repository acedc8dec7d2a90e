#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use pulsewatch_server::{
    app_state::AppState, config::PulseConfig, router::build_router, store::MemoryStore,
};

fn app_with_state() -> (Router, AppState) {
    let store = Arc::new(MemoryStore::new(Duration::from_secs(30)));
    let state = AppState::with_store(PulseConfig::default(), store);
    (build_router(state.clone()), state)
}

fn app() -> Router {
    app_with_state().0
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, String) {
    let mut req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::USER_AGENT, "route-tests")
        .header("x-forwarded-for", "198.51.100.7");
    let body = match body {
        Some(b) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(b.to_string())
        }
        None => Body::empty(),
    };

    let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn send_json(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let (status, text) = send(app, method, uri, body).await;
    (status, serde_json::from_str(&text).unwrap())
}

#[tokio::test]
async fn health_is_always_ok() {
    let (status, body) = send_json(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn ping_healthy_reports_metrics() {
    let (status, body) = send_json(&app(), Method::GET, "/ping", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["server"], "pulsewatch");
    // the ping itself counts the caller
    assert_eq!(body["metrics"]["connected_users"], 1);
    assert!(body.get("error_code").is_none());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn simulate_error_flips_ping_until_restored() {
    let app = app();

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/test-controls/simulate-error",
        Some(r#"{"error_type":"memory"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scenario"], "memory");
    assert_eq!(body["error"], "Memory usage critical - 95% used");

    let (status, body) = send_json(&app, Method::GET, "/ping", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "critical");
    assert_eq!(body["error_code"], "SIMULATED_ERROR");
    assert_eq!(body["error"], "Memory usage critical - 95% used");

    let (status, _) = send_json(&app, Method::POST, "/test-controls/force-healthy", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(&app, Method::GET, "/ping", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn simulate_error_without_body_uses_default_scenario() {
    let app = app();
    let (status, body) = send_json(&app, Method::POST, "/simulate-error", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scenario"], "database");

    let (_, body) = send_json(&app, Method::GET, "/ping", None).await;
    assert_eq!(body["error"], "Database connection pool exhausted");

    send_json(&app, Method::POST, "/force-healthy", None).await;
    let (status, _) = send_json(&app, Method::GET, "/ping", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn transactions_show_up_in_metrics() {
    let app = app();
    for _ in 0..3 {
        let (status, body) = send_json(&app, Method::POST, "/api/transaction", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    let (status, body) = send_json(&app, Method::GET, "/api/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_transactions"], 3);
    assert!(body["transactions_per_minute"].as_u64().unwrap() <= 3);
    assert_eq!(body["connected_users"], 1);
    assert!(body["uptime_seconds"].is_u64());
    assert!(body["response_time_ms"].is_number());
}

#[tokio::test]
async fn simulated_crash_is_a_500_not_an_abort() {
    let app = app();
    let (status, body) = send_json(&app, Method::POST, "/test-controls/simulate-crash", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "INTERNAL_ERROR");

    // the router keeps serving
    let (status, _) = send_json(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn status_breakdown_lists_services() {
    let app = app();
    let (status, body) = send_json(&app, Method::GET, "/api/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overall_status"], "operational");
    assert!(body["services"].as_array().unwrap().len() >= 3);

    send_json(&app, Method::POST, "/test-controls/simulate-error", Some(r#"{"error_type":"cpu"}"#)).await;
    let (_, body) = send_json(&app, Method::GET, "/api/status", None).await;
    assert_eq!(body["overall_status"], "critical");
}

#[tokio::test]
async fn preflight_gets_cors_headers() {
    let app = app();
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/transaction")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn prometheus_text_lists_requests_and_gauges() {
    let app = app();
    send(&app, Method::GET, "/health", None).await;
    send(&app, Method::POST, "/test-controls/simulate-error", None).await;

    let (status, text) = send(&app, Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("pulsewatch_http_requests_total"));
    assert!(text.contains("route=\"/health\""));
    assert!(text.contains("pulsewatch_fault_injections_total"));
    assert!(text.contains("pulsewatch_forced_fault 1"));
    assert!(text.contains("pulsewatch_active_callers"));
}

#[tokio::test]
async fn index_lists_storage() {
    let (status, body) = send_json(&app(), Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["storage"], "memory");
    assert!(body["endpoints"].is_object());
}

#[tokio::test]
async fn middleware_counts_and_times_each_route() {
    let (app, state) = app_with_state();
    send(&app, Method::GET, "/health", None).await;
    send(&app, Method::GET, "/health", None).await;
    send(&app, Method::POST, "/test-controls/simulate-crash", None).await;

    let metrics = state.metrics();
    assert_eq!(metrics.http_requests.get(&[("route", "/health"), ("status", "200")]), 2);
    // label order does not matter
    assert_eq!(
        metrics
            .http_requests
            .get(&[("status", "500"), ("route", "/test-controls/simulate-crash")]),
        1
    );
    assert_eq!(metrics.request_duration.count(&[("route", "/health")]), 2);
    assert_eq!(metrics.request_duration.count(&[("route", "/ping")]), 0);
}
