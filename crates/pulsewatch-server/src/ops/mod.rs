//! Operational HTTP endpoints.
//!
//! - `/health`     : liveness, always ok
//! - `/ping`       : health verdict + metrics (503 when critical)
//! - `/api/status` : per-service breakdown
//! - `/metrics`    : Prometheus text format

pub mod controls;

use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures_util::FutureExt;
use serde_json::json;

use pulsewatch_core::health::CODE_INTERNAL;
use pulsewatch_core::Timestamp;

use crate::app_state::AppState;
use crate::transport::caller::fingerprint_of;

fn rfc3339_now() -> String {
    chrono::Utc::now().to_rfc3339()
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// Liveness probe for upstream monitors: 200 when healthy, 503 otherwise.
///
/// A panic while evaluating is caught here and reported as a critical
/// `INTERNAL_ERROR` so the serving loop keeps going.
pub async fn ping(
    State(state): State<AppState>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
) -> Response {
    let now = Timestamp::now();
    let fingerprint = fingerprint_of(&headers, peer.as_ref());
    let telemetry = state.telemetry();

    let outcome = AssertUnwindSafe(async {
        telemetry.track_fingerprint(&fingerprint, now).await;
        telemetry.health(now).await
    })
    .catch_unwind()
    .await;

    let report = match outcome {
        Ok(report) => report,
        Err(_) => {
            tracing::error!("health evaluation panicked");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "critical",
                    "timestamp": rfc3339_now(),
                    "error": "Internal error while evaluating health",
                    "error_code": CODE_INTERNAL,
                })),
            )
                .into_response();
        }
    };

    let cfg = state.cfg();
    let mut body = json!({
        "status": report.verdict.status(),
        "timestamp": rfc3339_now(),
        "metrics": report.snapshot,
        "server": cfg.server.name,
        "version": cfg.server.version,
        "storage": telemetry.store_kind().name(),
    });

    let status = if report.verdict.is_healthy() {
        StatusCode::OK
    } else {
        body["error"] = json!(report.verdict.message());
        body["error_code"] = json!(report.verdict.code());
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(body)).into_response()
}

pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.telemetry().status_report(Timestamp::now()).await;
    Json(json!({
        "overall_status": report.overall_status,
        "services": report.services,
        "metrics": report.metrics,
        "timestamp": rfc3339_now(),
    }))
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let telemetry = state.telemetry();
    let snap = telemetry.metrics_snapshot(Timestamp::now()).await;
    let forced = u64::from(telemetry.forced_fault().is_some());
    let gauges = [
        ("pulsewatch_active_callers", snap.active_count),
        ("pulsewatch_transactions_per_minute", snap.rate_per_minute),
        ("pulsewatch_transactions", snap.total_transactions),
        ("pulsewatch_uptime_seconds", snap.uptime_seconds),
        ("pulsewatch_mean_latency_micros", (snap.mean_latency_ms * 1000.0).round() as u64),
        ("pulsewatch_forced_fault", forced),
        ("pulsewatch_backend_errors", telemetry.backend_errors()),
    ];
    let body = state.metrics().render(&gauges);

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}
