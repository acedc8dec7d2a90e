//! Wall-clock timestamps.
//!
//! Every time-dependent operation takes `now` explicitly so windows and
//! buckets can be exercised with synthetic clocks.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Length of one transaction bucket.
pub const BUCKET_SECS: u64 = 60;

/// Unix-epoch timestamp with millisecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Current wall-clock time. A clock before the epoch reads as zero.
    pub fn now() -> Self {
        let since = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self(since.as_millis() as u64)
    }

    pub fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }

    pub fn as_secs(self) -> u64 {
        self.0 / 1000
    }

    /// Calendar-aligned minute index: `floor(secs / 60)`.
    pub fn minute_bucket(self) -> u64 {
        self.as_secs() / BUCKET_SECS
    }

    /// Time elapsed from `earlier` to `self`, zero if `earlier` is later.
    pub fn since(self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }

    pub fn saturating_add(self, d: Duration) -> Self {
        Self(self.0.saturating_add(d.as_millis() as u64))
    }
}
