//! pulsewatch server library entry.
//!
//! Wires the storage backends, the telemetry engine, configuration, and the
//! HTTP surface into one server. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod api;
pub mod app_state;
pub mod config;
pub mod error;
pub mod obs;
pub mod ops;
pub mod router;
pub mod store;
pub mod telemetry;
pub mod transport;
