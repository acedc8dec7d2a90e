use std::sync::Arc;

use pulsewatch_core::error::Result;
use pulsewatch_core::{Fingerprint, Timestamp};

use crate::store::TelemetryStore;

/// Sliding window of active callers over a storage backend.
///
/// Holds no state of its own; the backend owns every record.
pub struct PresenceTracker {
    store: Arc<dyn TelemetryStore>,
}

impl PresenceTracker {
    pub fn new(store: Arc<dyn TelemetryStore>) -> Self {
        Self { store }
    }

    /// Mark the caller alive at `now`, then drop anything that aged out.
    pub async fn track(&self, fingerprint: &Fingerprint, now: Timestamp) -> Result<()> {
        self.store.record_presence(fingerprint, now).await?;
        let pruned = self.store.prune_expired(now).await?;
        if pruned > 0 {
            tracing::debug!(pruned, "expired presence records removed");
        }
        Ok(())
    }

    pub async fn active_count(&self, now: Timestamp) -> Result<u64> {
        self.store.count_active(now).await
    }
}
