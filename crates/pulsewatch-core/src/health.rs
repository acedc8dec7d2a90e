//! Health verdicts, metric snapshots, and operator-injected faults.

use std::fmt;
use std::sync::Mutex;

use serde::Serialize;

use crate::error::{PulseError, Result};

/// Verdict code for an operator-forced fault.
pub const CODE_SIMULATED: &str = "SIMULATED_ERROR";
/// Verdict code for an unexpected failure while evaluating health.
pub const CODE_INTERNAL: &str = "INTERNAL_ERROR";

/// Scenario labels accepted by fault injection, each with a canned message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultScenario {
    Database,
    Memory,
    Disk,
    ExternalApi,
    Cpu,
    /// Catch-all for labels outside the known set.
    Unknown,
}

impl FaultScenario {
    /// Scenario used when the operator gives no label.
    pub const DEFAULT: FaultScenario = FaultScenario::Database;

    /// Strict parse; unknown labels are `InvalidInput`.
    pub fn parse(label: &str) -> Result<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "database" => Ok(FaultScenario::Database),
            "memory" => Ok(FaultScenario::Memory),
            "disk" => Ok(FaultScenario::Disk),
            "api" | "external-api" | "external_api" => Ok(FaultScenario::ExternalApi),
            "cpu" => Ok(FaultScenario::Cpu),
            other => Err(PulseError::InvalidInput(format!("unknown fault scenario: {other}"))),
        }
    }

    /// Lenient parse: unknown labels fall back to [`FaultScenario::Unknown`].
    pub fn from_label(label: &str) -> Self {
        Self::parse(label).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to generic fault message");
            FaultScenario::Unknown
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            FaultScenario::Database => "database",
            FaultScenario::Memory => "memory",
            FaultScenario::Disk => "disk",
            FaultScenario::ExternalApi => "api",
            FaultScenario::Cpu => "cpu",
            FaultScenario::Unknown => "unknown",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            FaultScenario::Database => "Database connection pool exhausted",
            FaultScenario::Memory => "Memory usage critical - 95% used",
            FaultScenario::Disk => "Disk space critical - 98% full",
            FaultScenario::ExternalApi => "External API timeout - payment gateway unreachable",
            FaultScenario::Cpu => "CPU usage critical - 99% sustained load",
            FaultScenario::Unknown => "Unknown critical error",
        }
    }
}

/// An active forced fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForcedFault {
    pub scenario: FaultScenario,
    pub message: &'static str,
}

/// Process-wide fault flag: clear, or forced into a scenario.
///
/// Independent of every counter; only operator actions change it.
#[derive(Debug, Default)]
pub struct FaultSwitch {
    state: Mutex<Option<ForcedFault>>,
}

impl FaultSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a fault. Setting twice keeps the latest scenario.
    pub fn set(&self, scenario: FaultScenario) -> ForcedFault {
        let fault = ForcedFault { scenario, message: scenario.message() };
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = Some(fault);
        fault
    }

    /// Clear the flag. No-op when already clear.
    pub fn clear(&self) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn current(&self) -> Option<ForcedFault> {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Result of one health evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthVerdict {
    Healthy,
    Critical { code: String, message: String },
}

impl HealthVerdict {
    pub fn critical(code: impl Into<String>, message: impl Into<String>) -> Self {
        HealthVerdict::Critical { code: code.into(), message: message.into() }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthVerdict::Healthy)
    }

    /// `"healthy"` or `"critical"`, as reported to monitors.
    pub fn status(&self) -> &'static str {
        match self {
            HealthVerdict::Healthy => "healthy",
            HealthVerdict::Critical { .. } => "critical",
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            HealthVerdict::Healthy => None,
            HealthVerdict::Critical { code, .. } => Some(code),
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            HealthVerdict::Healthy => None,
            HealthVerdict::Critical { message, .. } => Some(message),
        }
    }
}

impl fmt::Display for HealthVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthVerdict::Healthy => f.write_str("HEALTHY"),
            HealthVerdict::Critical { code, message } => write!(f, "CRITICAL({code}: {message})"),
        }
    }
}

/// Point-in-time telemetry counters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MetricsSnapshot {
    #[serde(rename = "connected_users")]
    pub active_count: u64,
    #[serde(rename = "transactions_per_minute")]
    pub rate_per_minute: u64,
    pub total_transactions: u64,
    pub uptime_seconds: u64,
    #[serde(rename = "response_time_ms")]
    pub mean_latency_ms: f64,
}
