//! Axum router wiring.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{api, app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    let controls = Router::new()
        .route("/simulate-error", post(ops::controls::simulate_error))
        .route("/force-healthy", post(ops::controls::force_healthy))
        .route("/simulate-crash", post(ops::controls::simulate_crash));

    Router::new()
        .route("/", get(api::index))
        .route("/api/metrics", get(api::metrics))
        .route("/api/transaction", post(api::transaction))
        .route("/api/status", get(ops::status))
        .route("/ping", get(ops::ping))
        .route("/health", get(ops::healthz))
        .route("/metrics", get(ops::metrics))
        .nest("/test-controls", controls)
        // legacy paths used by existing alert drills
        .route("/simulate-error", post(ops::controls::simulate_error))
        .route("/force-healthy", post(ops::controls::force_healthy))
        .layer(middleware::from_fn_with_state(state.clone(), transport::middleware::track_request))
        .layer(middleware::from_fn(transport::middleware::cors))
        .with_state(state)
}
