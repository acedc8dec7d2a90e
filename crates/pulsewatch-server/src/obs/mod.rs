//! In-process request metrics rendered at `/metrics`.
//!
//! Kept separate from the telemetry engine: these describe the HTTP server
//! itself, the engine describes callers and transactions.

pub mod metrics;

pub use metrics::ServerMetrics;
