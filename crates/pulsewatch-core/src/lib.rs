//! pulsewatch core: transport-agnostic telemetry primitives and error types.
//!
//! This crate holds the pieces of the aggregation engine that need no runtime
//! or storage: caller fingerprints, timestamps and minute buckets, the bounded
//! latency sample, fault scenarios and health verdicts. The server crate
//! builds the storage backends and the HTTP surface on top of it.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Fallible paths
//! surface as `PulseError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod fingerprint;
pub mod health;
pub mod latency;
pub mod time;

/// Shared result type.
pub use error::{ErrorCode, PulseError, Result};
pub use fingerprint::Fingerprint;
pub use health::{FaultScenario, FaultSwitch, HealthVerdict, MetricsSnapshot};
pub use latency::{LatencyWindow, RequestTimer};
pub use time::Timestamp;
