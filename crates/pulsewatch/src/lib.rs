//! Top-level facade crate for pulsewatch.
//!
//! Re-exports the core primitives and the server library so users can depend
//! on a single crate.

pub mod core {
    pub use pulsewatch_core::*;
}

pub mod server {
    pub use pulsewatch_server::*;
}
