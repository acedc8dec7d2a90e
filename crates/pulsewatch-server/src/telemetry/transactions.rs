use std::sync::Arc;
use std::time::Duration;

use pulsewatch_core::error::Result;
use pulsewatch_core::Timestamp;

use crate::store::TelemetryStore;

/// Lifetime of one minute bucket after its latest increment.
pub const BUCKET_TTL: Duration = Duration::from_secs(120);

/// Name of the lifetime transaction total.
pub const TOTAL_NAME: &str = "transactions";

/// Storage key for the minute bucket containing `now`.
pub fn bucket_key(now: Timestamp) -> String {
    format!("transactions:{}", now.minute_bucket())
}

/// Per-minute and lifetime transaction counts.
///
/// `rate_per_minute` reads the fixed, calendar-aligned minute that contains
/// `now`, not a rolling 60 second sum. Right after a minute boundary it
/// reports only what arrived since the boundary.
pub struct TransactionCounter {
    store: Arc<dyn TelemetryStore>,
}

impl TransactionCounter {
    pub fn new(store: Arc<dyn TelemetryStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, now: Timestamp) -> Result<()> {
        self.store.increment_counter(&bucket_key(now), now, BUCKET_TTL).await?;
        self.store.increment_total(TOTAL_NAME).await?;
        Ok(())
    }

    pub async fn rate_per_minute(&self, now: Timestamp) -> Result<u64> {
        self.store.read_counter(&bucket_key(now), now).await
    }

    pub async fn total(&self) -> Result<u64> {
        self.store.read_total(TOTAL_NAME).await
    }
}
