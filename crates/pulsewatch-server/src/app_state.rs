//! Shared application state for the pulsewatch server.
//!
//! Holds the config, the telemetry engine, and the server's own request
//! metrics. Cheap to clone; handlers receive it through axum `State`.

use std::sync::Arc;

use pulsewatch_core::error::Result;

use crate::config::PulseConfig;
use crate::obs::ServerMetrics;
use crate::store::{self, TelemetryStore};
use crate::telemetry::Telemetry;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    telemetry: Arc<Telemetry>,
}

struct AppStateInner {
    cfg: PulseConfig,
    metrics: ServerMetrics,
}

impl AppState {
    /// Connect the configured backend and build state.
    /// Returns Result so main can report startup errors instead of panicking.
    pub async fn new(cfg: PulseConfig) -> Result<Self> {
        let store = store::connect(&cfg.store, cfg.telemetry.presence_window()).await?;
        Ok(Self::with_store(cfg, store))
    }

    /// Build state over an already constructed backend.
    pub fn with_store(cfg: PulseConfig, store: Arc<dyn TelemetryStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                metrics: ServerMetrics::default(),
            }),
            telemetry: Arc::new(Telemetry::new(store)),
        }
    }

    pub fn cfg(&self) -> &PulseConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> &ServerMetrics {
        &self.inner.metrics
    }

    pub fn telemetry(&self) -> Arc<Telemetry> {
        Arc::clone(&self.telemetry)
    }
}
