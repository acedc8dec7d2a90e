//! Storage backends for presence records and counters.
//!
//! Two variants satisfy one contract: [`MemoryStore`] keeps everything in
//! process, [`RedisStore`] delegates to Redis and its key expiry. The variant
//! is chosen once by [`connect`] and held as `Arc<dyn TelemetryStore>`.

mod memory;
mod redis;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use pulsewatch_core::error::Result;
use pulsewatch_core::{Fingerprint, Timestamp};

use crate::config::{BackendChoice, StoreSection};

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// Backend variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Redis,
}

impl StoreKind {
    /// Lower-case name reported as `storage`.
    pub fn name(self) -> &'static str {
        match self {
            StoreKind::Memory => "memory",
            StoreKind::Redis => "redis",
        }
    }

    /// Human name used in health messages.
    pub fn display_name(self) -> &'static str {
        match self {
            StoreKind::Memory => "Memory",
            StoreKind::Redis => "Redis",
        }
    }

    /// External backends can lose connectivity and are probed by health checks.
    pub fn is_external(self) -> bool {
        matches!(self, StoreKind::Redis)
    }
}

/// Storage contract shared by every backend.
///
/// Implementations must be safe under concurrent calls: increments are
/// atomic per key, presence upserts are last-write-wins.
#[async_trait]
pub trait TelemetryStore: Send + Sync {
    fn kind(&self) -> StoreKind;

    /// Upsert `last_seen = now` for the fingerprint.
    async fn record_presence(&self, fingerprint: &Fingerprint, now: Timestamp) -> Result<()>;

    /// Distinct fingerprints with `now - last_seen <= presence_window`.
    async fn count_active(&self, now: Timestamp) -> Result<u64>;

    /// Drop aged-out presence records and counters; returns how many presence
    /// records went. Backends with native expiry return 0.
    async fn prune_expired(&self, now: Timestamp) -> Result<u64>;

    /// Atomically add one to `key` and (re)arm its expiry `ttl` from `now`.
    async fn increment_counter(&self, key: &str, now: Timestamp, ttl: Duration) -> Result<u64>;

    /// Current value of `key`, 0 if absent or expired.
    async fn read_counter(&self, key: &str, now: Timestamp) -> Result<u64>;

    /// Non-expiring monotonic counter.
    async fn increment_total(&self, name: &str) -> Result<u64>;

    async fn read_total(&self, name: &str) -> Result<u64>;

    /// Liveness probe.
    async fn ping(&self) -> Result<()>;
}

/// Build the configured backend.
///
/// `auto` prefers Redis when a URL is set and falls back to memory if it
/// cannot connect; `redis` treats a failed connection as fatal.
pub async fn connect(cfg: &StoreSection, presence_window: Duration) -> Result<Arc<dyn TelemetryStore>> {
    match (cfg.backend, cfg.redis_url.as_deref()) {
        (BackendChoice::Memory, _) | (BackendChoice::Auto, None) => {
            tracing::info!(window_secs = presence_window.as_secs(), "using in-memory storage (data resets on restart)");
            Ok(Arc::new(MemoryStore::new(presence_window)))
        }
        (BackendChoice::Redis, url) => {
            let url = url.unwrap_or_default();
            let store = RedisStore::connect(url, &cfg.key_prefix, presence_window, cfg.op_timeout()).await?;
            tracing::info!(prefix = %cfg.key_prefix, "using redis storage");
            Ok(Arc::new(store))
        }
        (BackendChoice::Auto, Some(url)) => {
            match RedisStore::connect(url, &cfg.key_prefix, presence_window, cfg.op_timeout()).await {
                Ok(store) => {
                    tracing::info!(prefix = %cfg.key_prefix, "using redis storage");
                    Ok(Arc::new(store))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "redis unavailable, using in-memory storage (data resets on restart)");
                    Ok(Arc::new(MemoryStore::new(presence_window)))
                }
            }
        }
    }
}
