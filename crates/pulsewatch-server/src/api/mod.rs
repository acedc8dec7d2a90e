//! Public JSON API. Every route here counts the caller as active.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    Json,
};
use serde_json::{json, Value};

use pulsewatch_core::{MetricsSnapshot, Timestamp};

use crate::app_state::AppState;
use crate::transport::caller::fingerprint_of;

async fn track(state: &AppState, headers: &HeaderMap, peer: Option<&ConnectInfo<SocketAddr>>, now: Timestamp) {
    let fingerprint = fingerprint_of(headers, peer);
    state.telemetry().track_fingerprint(&fingerprint, now).await;
}

/// `GET /` — service index.
pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
) -> Json<Value> {
    track(&state, &headers, peer.as_ref(), Timestamp::now()).await;
    Json(json!({
        "service": state.cfg().server.name,
        "version": state.cfg().server.version,
        "storage": state.telemetry().store_kind().name(),
        "endpoints": {
            "metrics": "GET /api/metrics",
            "transaction": "POST /api/transaction",
            "status": "GET /api/status",
            "ping": "GET /ping",
            "health": "GET /health",
            "prometheus": "GET /metrics",
            "test_controls": "POST /test-controls/{simulate-error,force-healthy,simulate-crash}"
        }
    }))
}

/// `GET /api/metrics`
pub async fn metrics(
    State(state): State<AppState>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
) -> Json<MetricsSnapshot> {
    let now = Timestamp::now();
    track(&state, &headers, peer.as_ref(), now).await;
    Json(state.telemetry().metrics_snapshot(now).await)
}

/// `POST /api/transaction`
pub async fn transaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
) -> Json<Value> {
    let now = Timestamp::now();
    track(&state, &headers, peer.as_ref(), now).await;
    let recorded = state.telemetry().record_transaction(now).await;
    Json(json!({ "success": recorded }))
}
