//! pulsewatch server binary.
//!
//! - Config: `PULSEWATCH_CONFIG` (default `pulsewatch.yaml`) + env overrides
//! - Storage: Redis or in-memory, chosen once at startup
//! - Peer addresses reach handlers through `ConnectInfo`
//! - Graceful shutdown on Ctrl-C

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use pulsewatch_core::error::{PulseError, Result};
use pulsewatch_server::{app_state::AppState, config, router};

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    if let Err(e) = run().await {
        tracing::error!(code = e.code().as_str(), error = %e, "pulsewatch-server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::var("PULSEWATCH_CONFIG")
        .unwrap_or_else(|_| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::load(&path, |key| std::env::var(key).ok())?;
    let listen = cfg.server.listen_addr()?;

    let state = AppState::new(cfg).await?;
    let storage = state.telemetry().store_kind().name();
    let app = router::build_router(state);

    tracing::info!(%listen, storage, "pulsewatch-server starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| PulseError::BadConfig(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| PulseError::InternalFault(format!("server failed: {e}")))?;

    tracing::info!("pulsewatch-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
