use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use pulsewatch_core::error::{PulseError, Result};
use pulsewatch_core::health::{ForcedFault, CODE_INTERNAL};
use pulsewatch_core::{
    FaultScenario, FaultSwitch, Fingerprint, HealthVerdict, LatencyWindow, MetricsSnapshot,
    RequestTimer, Timestamp,
};

use crate::store::{StoreKind, TelemetryStore};
use crate::telemetry::health::{
    self, HealthReport, OverallStatus, ServiceState, ServiceStatus, StatusReport,
};
use crate::telemetry::presence::PresenceTracker;
use crate::telemetry::transactions::TransactionCounter;

/// The aggregation engine: presence, transactions, latency, and health.
///
/// Constructed once per process (or per test) and shared by `Arc`. A fresh
/// instance starts with the fault flag clear, an empty latency sample, and
/// its uptime clock at construction. Counters start wherever the backend is.
///
/// Public operations never fail: backend errors degrade counts to zero and
/// are tallied in [`Telemetry::backend_errors`].
pub struct Telemetry {
    store: Arc<dyn TelemetryStore>,
    presence: PresenceTracker,
    transactions: TransactionCounter,
    latency: LatencyWindow,
    faults: FaultSwitch,
    started: Instant,
    backend_errors: AtomicU64,
}

impl Telemetry {
    pub fn new(store: Arc<dyn TelemetryStore>) -> Self {
        Self {
            presence: PresenceTracker::new(Arc::clone(&store)),
            transactions: TransactionCounter::new(Arc::clone(&store)),
            store,
            latency: LatencyWindow::new(),
            faults: FaultSwitch::new(),
            started: Instant::now(),
            backend_errors: AtomicU64::new(0),
        }
    }

    pub fn store_kind(&self) -> StoreKind {
        self.store.kind()
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// Backend failures absorbed since construction.
    pub fn backend_errors(&self) -> u64 {
        self.backend_errors.load(Ordering::Relaxed)
    }

    pub fn on_request_start(&self) -> RequestTimer {
        RequestTimer::start()
    }

    /// Feed the elapsed time into the latency sample; returns it in ms.
    pub fn on_request_end(&self, timer: RequestTimer) -> f64 {
        let elapsed_ms = timer.elapsed_ms();
        self.latency.observe(elapsed_ms);
        elapsed_ms
    }

    pub fn observe_latency(&self, duration_ms: f64) {
        self.latency.observe(duration_ms);
    }

    /// Count the caller identified by `origin` + `client` as active at `now`.
    pub async fn track_visit(&self, origin: &str, client: &str, now: Timestamp) {
        let fingerprint = Fingerprint::derive(origin, client);
        self.track_fingerprint(&fingerprint, now).await;
    }

    pub async fn track_fingerprint(&self, fingerprint: &Fingerprint, now: Timestamp) {
        if let Err(e) = self.presence.track(fingerprint, now).await {
            self.absorb("track_visit", &e);
        }
    }

    /// Returns whether the transaction was stored.
    pub async fn record_transaction(&self, now: Timestamp) -> bool {
        match self.transactions.record(now).await {
            Ok(()) => true,
            Err(e) => {
                self.absorb("record_transaction", &e);
                false
            }
        }
    }

    pub async fn active_count(&self, now: Timestamp) -> u64 {
        let r = self.presence.active_count(now).await;
        self.or_zero("active_count", r)
    }

    pub async fn rate_per_minute(&self, now: Timestamp) -> u64 {
        let r = self.transactions.rate_per_minute(now).await;
        self.or_zero("rate_per_minute", r)
    }

    pub async fn total_transactions(&self) -> u64 {
        let r = self.transactions.total().await;
        self.or_zero("total_transactions", r)
    }

    /// Counters with backend failures degraded to zero.
    pub async fn metrics_snapshot(&self, now: Timestamp) -> MetricsSnapshot {
        match self.try_snapshot(now).await {
            Ok((snapshot, _)) => snapshot,
            Err(e) => {
                tracing::error!(error = %e, "metrics snapshot failed");
                self.fallback_snapshot()
            }
        }
    }

    /// Verdict and snapshot, evaluated independently and bundled.
    ///
    /// A forced fault or a failed liveness probe keeps its own verdict. A
    /// healthy verdict turns critical when the snapshot had to absorb backend
    /// failures, or when it failed outright.
    pub async fn health(&self, now: Timestamp) -> HealthReport {
        let verdict = health::evaluate(&self.faults, self.store.as_ref()).await;
        match self.try_snapshot(now).await {
            Ok((snapshot, degraded)) => {
                let verdict = if degraded && verdict.is_healthy() {
                    health::backend_lost(self.store.kind())
                } else {
                    verdict
                };
                HealthReport { verdict, snapshot }
            }
            Err(e) => {
                tracing::error!(error = %e, "health snapshot failed");
                let verdict = if verdict.is_healthy() {
                    HealthVerdict::critical(CODE_INTERNAL, "Internal error while computing metrics")
                } else {
                    verdict
                };
                HealthReport {
                    verdict,
                    snapshot: self.fallback_snapshot(),
                }
            }
        }
    }

    /// Per-service breakdown for external status monitors.
    pub async fn status_report(&self, now: Timestamp) -> StatusReport {
        let mut report = StatusReport::new(self.metrics_snapshot(now).await);

        report.push(
            ServiceStatus::new("Web Server", ServiceState::Operational),
            OverallStatus::Operational,
        );

        match self.presence.active_count(now).await {
            Ok(_) => report.push(
                ServiceStatus::new("API Services", ServiceState::Operational),
                OverallStatus::Operational,
            ),
            Err(e) => {
                self.absorb("status_report", &e);
                report.push(
                    ServiceStatus::new("API Services", ServiceState::Degraded),
                    OverallStatus::Degraded,
                );
            }
        }

        let kind = self.store.kind();
        if kind.is_external() {
            let name = match kind {
                StoreKind::Redis => "Redis Cache",
                StoreKind::Memory => "Memory Store",
            };
            match self.store.ping().await {
                Ok(()) => report.push(
                    ServiceStatus::new(name, ServiceState::Operational),
                    OverallStatus::Operational,
                ),
                Err(e) => {
                    self.absorb("status_report", &e);
                    report.push(ServiceStatus::new(name, ServiceState::Down), OverallStatus::Degraded);
                }
            }
        }

        match self.faults.current() {
            Some(fault) => report.push(
                ServiceStatus {
                    name: "Health Check",
                    status: ServiceState::Critical,
                    error: Some(fault.message),
                },
                OverallStatus::Critical,
            ),
            None => report.push(
                ServiceStatus::new("Health Check", ServiceState::Operational),
                OverallStatus::Operational,
            ),
        }

        report
    }

    /// Force the health verdict critical. `None` picks the default scenario;
    /// unknown labels get the generic message.
    pub fn set_fault(&self, label: Option<&str>) -> ForcedFault {
        let scenario = label
            .map(FaultScenario::from_label)
            .unwrap_or(FaultScenario::DEFAULT);
        let fault = self.faults.set(scenario);
        tracing::warn!(scenario = scenario.label(), message = fault.message, "forced fault injected");
        fault
    }

    pub fn clear_fault(&self) {
        if self.faults.current().is_some() {
            tracing::info!("forced fault cleared");
        }
        self.faults.clear();
    }

    pub fn forced_fault(&self) -> Option<ForcedFault> {
        self.faults.current()
    }

    /// Snapshot plus whether any field was zeroed by a backend failure.
    async fn try_snapshot(&self, now: Timestamp) -> Result<(MetricsSnapshot, bool)> {
        let mut degraded = false;
        let active_count = self.settle(
            "active_count",
            self.presence.active_count(now).await,
            &mut degraded,
        )?;
        let rate_per_minute = self.settle(
            "rate_per_minute",
            self.transactions.rate_per_minute(now).await,
            &mut degraded,
        )?;
        let total_transactions = self.settle(
            "total_transactions",
            self.transactions.total().await,
            &mut degraded,
        )?;

        let snapshot = MetricsSnapshot {
            active_count,
            rate_per_minute,
            total_transactions,
            uptime_seconds: self.uptime_secs(),
            mean_latency_ms: self.latency.mean(),
        };
        Ok((snapshot, degraded))
    }

    fn fallback_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_seconds: self.uptime_secs(),
            mean_latency_ms: self.latency.mean(),
            ..MetricsSnapshot::default()
        }
    }

    /// Backend failures become zero and set `degraded`; anything else propagates.
    fn settle(&self, op: &'static str, r: Result<u64>, degraded: &mut bool) -> Result<u64> {
        match r {
            Ok(v) => Ok(v),
            Err(e) if e.is_backend() => {
                self.absorb(op, &e);
                *degraded = true;
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    fn or_zero(&self, op: &'static str, r: Result<u64>) -> u64 {
        match self.settle(op, r, &mut false) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(op, error = %e, "unexpected storage failure");
                0
            }
        }
    }

    fn absorb(&self, op: &'static str, e: &PulseError) {
        self.backend_errors.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(op, code = e.code().as_str(), error = %e, "storage operation degraded");
    }
}
