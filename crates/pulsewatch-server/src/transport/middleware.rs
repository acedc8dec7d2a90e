use std::time::Duration;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;

/// Time every request into the latency sample and the request metrics.
pub async fn track_request(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let method = req.method().clone();

    let telemetry = state.telemetry();
    let timer = telemetry.on_request_start();
    let resp = next.run(req).await;
    let elapsed_ms = telemetry.on_request_end(timer);

    let status = resp.status();
    let metrics = state.metrics();
    metrics.http_requests.inc(&[("route", &route), ("status", status.as_str())]);
    metrics
        .request_duration
        .observe(&[("route", &route)], Duration::from_secs_f64(elapsed_ms / 1000.0));

    tracing::debug!(%method, %route, status = status.as_u16(), elapsed_ms, "request served");
    resp
}

/// Permissive CORS: any origin, preflight answered directly.
pub async fn cors(req: Request, next: Next) -> Response {
    let mut resp = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    let headers = resp.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type"),
    );
    resp
}
