//! Test-control affordances.
//!
//! These endpoints falsify the health verdict on purpose so downstream
//! alerting can be exercised. They are mounted under `/test-controls/` and
//! must not be exposed where monitors are trusted blindly.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use pulsewatch_core::PulseError;

use crate::app_state::AppState;
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
struct FaultRequest {
    #[serde(default)]
    error_type: Option<String>,
}

/// `POST /test-controls/simulate-error` with optional `{"error_type": ...}`.
///
/// A missing or non-JSON body selects the default scenario.
pub async fn simulate_error(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<Value>) {
    let req: FaultRequest = serde_json::from_slice(&body).unwrap_or_default();
    let fault = state.telemetry().set_fault(req.error_type.as_deref());
    state
        .metrics()
        .fault_injections
        .inc(&[("scenario", fault.scenario.label())]);

    (
        StatusCode::OK,
        Json(json!({
            "message": "Server forced into CRITICAL state",
            "scenario": fault.scenario.label(),
            "error": fault.message,
            "note": "Check /ping endpoint - it will return critical status",
            "restore": "POST to /test-controls/force-healthy to restore",
        })),
    )
}

/// `POST /test-controls/force-healthy`
pub async fn force_healthy(State(state): State<AppState>) -> Json<Value> {
    state.telemetry().clear_fault();
    Json(json!({
        "message": "Server restored to HEALTHY state",
        "note": "Check /ping endpoint - it will return healthy status",
    }))
}

/// `POST /test-controls/simulate-crash` — fails the request, not the process.
pub async fn simulate_crash() -> Result<Json<Value>, ApiError> {
    tracing::warn!("simulated crash requested");
    Err(PulseError::InternalFault("simulated server crash".into()).into())
}
