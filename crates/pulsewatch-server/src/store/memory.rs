use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;

use pulsewatch_core::error::Result;
use pulsewatch_core::{Fingerprint, Timestamp};

use super::{StoreKind, TelemetryStore};

#[derive(Debug, Clone, Copy)]
struct CounterEntry {
    value: u64,
    expires_at: Timestamp,
}

impl CounterEntry {
    fn is_live(&self, now: Timestamp) -> bool {
        now < self.expires_at
    }
}

/// In-process backend. Never fails; contents vanish with the process.
///
/// Expiry is explicit: reads filter on `now`, and `prune_expired` removes
/// what has aged out.
#[derive(Debug)]
pub struct MemoryStore {
    presence_window: Duration,
    presence: DashMap<String, Timestamp>,
    counters: DashMap<String, CounterEntry>,
    totals: DashMap<String, AtomicU64>,
}

impl MemoryStore {
    pub fn new(presence_window: Duration) -> Self {
        Self {
            presence_window,
            presence: DashMap::new(),
            counters: DashMap::new(),
            totals: DashMap::new(),
        }
    }

    fn is_present(&self, last_seen: Timestamp, now: Timestamp) -> bool {
        now.since(last_seen) <= self.presence_window
    }

    /// Presence records currently held, expired or not.
    pub fn presence_len(&self) -> usize {
        self.presence.len()
    }
}

#[async_trait]
impl TelemetryStore for MemoryStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Memory
    }

    async fn record_presence(&self, fingerprint: &Fingerprint, now: Timestamp) -> Result<()> {
        self.presence.insert(fingerprint.as_str().to_string(), now);
        Ok(())
    }

    async fn count_active(&self, now: Timestamp) -> Result<u64> {
        let n = self
            .presence
            .iter()
            .filter(|e| self.is_present(*e.value(), now))
            .count();
        Ok(n as u64)
    }

    async fn prune_expired(&self, now: Timestamp) -> Result<u64> {
        let mut removed = 0u64;
        self.presence.retain(|_, last_seen| {
            let keep = self.is_present(*last_seen, now);
            if !keep {
                removed += 1;
            }
            keep
        });
        self.counters.retain(|_, entry| entry.is_live(now));
        Ok(removed)
    }

    async fn increment_counter(&self, key: &str, now: Timestamp, ttl: Duration) -> Result<u64> {
        // The entry guard holds the shard lock, so read-modify-write is atomic.
        let mut entry = self
            .counters
            .entry(key.to_string())
            .or_insert(CounterEntry { value: 0, expires_at: now });
        if !entry.is_live(now) {
            entry.value = 0;
        }
        entry.value += 1;
        entry.expires_at = now.saturating_add(ttl);
        Ok(entry.value)
    }

    async fn read_counter(&self, key: &str, now: Timestamp) -> Result<u64> {
        Ok(self
            .counters
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.value)
            .unwrap_or(0))
    }

    async fn increment_total(&self, name: &str) -> Result<u64> {
        let total = self
            .totals
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0));
        Ok(total.fetch_add(1, Ordering::Relaxed) + 1)
    }

    async fn read_total(&self, name: &str) -> Result<u64> {
        Ok(self
            .totals
            .get(name)
            .map(|t| t.load(Ordering::Relaxed))
            .unwrap_or(0))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
