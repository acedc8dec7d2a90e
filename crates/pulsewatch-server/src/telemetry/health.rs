//! Health evaluation and the per-service status breakdown.

use serde::Serialize;

use pulsewatch_core::health::{FaultSwitch, HealthVerdict, MetricsSnapshot, CODE_SIMULATED};

use crate::store::{StoreKind, TelemetryStore};

/// Evaluate the verdict fresh; nothing here is cached between calls.
///
/// Order: forced fault, then external backend liveness, then healthy.
pub async fn evaluate(faults: &FaultSwitch, store: &dyn TelemetryStore) -> HealthVerdict {
    if let Some(fault) = faults.current() {
        return HealthVerdict::critical(CODE_SIMULATED, fault.message);
    }

    let kind = store.kind();
    if kind.is_external() {
        if let Err(e) = store.ping().await {
            tracing::warn!(backend = kind.name(), error = %e, "backend liveness probe failed");
            return backend_lost(kind);
        }
    }

    HealthVerdict::Healthy
}

/// `<BACKEND>_CONNECTION_ERROR` verdict for a backend that stopped answering.
pub fn backend_lost(kind: StoreKind) -> HealthVerdict {
    HealthVerdict::critical(
        format!("{}_CONNECTION_ERROR", kind.name().to_ascii_uppercase()),
        format!("{} connection lost", kind.display_name()),
    )
}

/// Verdict plus the counters, as returned to liveness probes.
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub verdict: HealthVerdict,
    pub snapshot: MetricsSnapshot,
}

/// State of one service line in the status breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Operational,
    Degraded,
    Down,
    Critical,
}

/// Overall roll-up; ordered by severity so the worst wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Operational,
    Degraded,
    Critical,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub name: &'static str,
    pub status: ServiceState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl ServiceStatus {
    pub fn new(name: &'static str, status: ServiceState) -> Self {
        Self { name, status, error: None }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub overall_status: OverallStatus,
    pub services: Vec<ServiceStatus>,
    pub metrics: MetricsSnapshot,
}

impl StatusReport {
    pub fn new(metrics: MetricsSnapshot) -> Self {
        Self {
            overall_status: OverallStatus::Operational,
            services: Vec::new(),
            metrics,
        }
    }

    /// Append a service line and raise the overall status to at least `floor`.
    pub fn push(&mut self, service: ServiceStatus, floor: OverallStatus) {
        self.overall_status = self.overall_status.max(floor);
        self.services.push(service);
    }
}
