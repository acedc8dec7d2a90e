//! Metrics aggregation engine.
//!
//! Presence tracking and transaction counting run over a storage backend;
//! the latency sample and fault flag live in process. [`Telemetry`] bundles
//! them behind the operations the HTTP layer calls.

pub mod engine;
pub mod health;
pub mod presence;
pub mod transactions;

pub use engine::Telemetry;
pub use health::{HealthReport, OverallStatus, ServiceState, ServiceStatus, StatusReport};
pub use presence::PresenceTracker;
pub use transactions::TransactionCounter;
