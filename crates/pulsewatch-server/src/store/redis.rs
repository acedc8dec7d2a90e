use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use ::redis::aio::ConnectionManager;
use ::redis::{Client, RedisResult};
use async_trait::async_trait;
use tokio::time::timeout;

use pulsewatch_core::error::{PulseError, Result};
use pulsewatch_core::{Fingerprint, Timestamp};

use super::{StoreKind, TelemetryStore};

/// Keys fetched per SCAN round-trip.
const SCAN_BATCH: usize = 200;

/// Redis backend.
///
/// Key layout under `prefix`:
/// - `presence:{fingerprint}` -> last_seen millis, `PX presence_window`
/// - `counter:{key}` -> integer, `PEXPIRE ttl` on every increment
/// - `total:{name}` -> integer, no expiry
///
/// Every round-trip is bounded by `op_timeout`; failures and timeouts surface
/// as `BackendUnavailable`.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    prefix: String,
    presence_window: Duration,
    op_timeout: Duration,
}

impl RedisStore {
    /// Connect and verify with a PING.
    ///
    /// A malformed URL is a config error; an unreachable server is
    /// `BackendUnavailable`.
    pub async fn connect(
        url: &str,
        prefix: &str,
        presence_window: Duration,
        op_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::open(url)
            .map_err(|e| PulseError::BadConfig(format!("invalid redis url: {e}")))?;

        let conn = match timeout(op_timeout, ConnectionManager::new(client)).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => return Err(PulseError::BackendUnavailable(format!("redis connect: {e}"))),
            Err(_) => {
                return Err(PulseError::BackendUnavailable(format!(
                    "redis connect: timed out after {}ms",
                    op_timeout.as_millis()
                )))
            }
        };

        let store = Self {
            conn,
            prefix: prefix.to_string(),
            presence_window,
            op_timeout,
        };
        store.ping().await?;
        Ok(store)
    }

    fn presence_key(&self, fingerprint: &Fingerprint) -> String {
        format!("{}presence:{}", self.prefix, fingerprint)
    }

    fn counter_key(&self, key: &str) -> String {
        format!("{}counter:{}", self.prefix, key)
    }

    fn total_key(&self, name: &str) -> String {
        format!("{}total:{}", self.prefix, name)
    }

    /// Run one round-trip under the op timeout.
    async fn run<T, F>(&self, op: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match timeout(self.op_timeout, fut).await {
            Ok(Ok(v)) => Ok(v),
            Ok(Err(e)) => {
                tracing::warn!(op, error = %e, "redis command failed");
                Err(PulseError::BackendUnavailable(format!("{op}: {e}")))
            }
            Err(_) => {
                tracing::warn!(op, timeout_ms = self.op_timeout.as_millis() as u64, "redis command timed out");
                Err(PulseError::BackendUnavailable(format!("{op}: timed out")))
            }
        }
    }
}

#[async_trait]
impl TelemetryStore for RedisStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Redis
    }

    async fn record_presence(&self, fingerprint: &Fingerprint, now: Timestamp) -> Result<()> {
        let key = self.presence_key(fingerprint);
        let window_ms = self.presence_window.as_millis() as u64;
        let mut conn = self.conn.clone();
        self.run("record_presence", async move {
            ::redis::cmd("SET")
                .arg(&key)
                .arg(now.as_millis())
                .arg("PX")
                .arg(window_ms)
                .query_async::<_, ()>(&mut conn)
                .await
        })
        .await
    }

    async fn count_active(&self, now: Timestamp) -> Result<u64> {
        let pattern = format!("{}presence:*", self.prefix);
        // SCAN may yield a key more than once.
        let mut active: HashSet<String> = HashSet::new();
        let mut cursor: u64 = 0;

        loop {
            let mut conn = self.conn.clone();
            let pat = pattern.clone();
            let (next, keys) = self
                .run("scan", async move {
                    ::redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(&pat)
                        .arg("COUNT")
                        .arg(SCAN_BATCH)
                        .query_async::<_, (u64, Vec<String>)>(&mut conn)
                        .await
                })
                .await?;

            if !keys.is_empty() {
                let mut conn = self.conn.clone();
                let batch = keys.clone();
                let seen = self
                    .run("mget", async move {
                        ::redis::cmd("MGET")
                            .arg(&batch)
                            .query_async::<_, Vec<Option<u64>>>(&mut conn)
                            .await
                    })
                    .await?;

                // Keys can expire between SCAN and MGET; those read as nil.
                for (key, last_seen) in keys.into_iter().zip(seen) {
                    if let Some(ms) = last_seen {
                        if now.since(Timestamp::from_millis(ms)) <= self.presence_window {
                            active.insert(key);
                        }
                    }
                }
            }

            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        Ok(active.len() as u64)
    }

    async fn prune_expired(&self, _now: Timestamp) -> Result<u64> {
        Ok(0)
    }

    async fn increment_counter(&self, key: &str, _now: Timestamp, ttl: Duration) -> Result<u64> {
        let key = self.counter_key(key);
        let ttl_ms = ttl.as_millis() as u64;
        let mut conn = self.conn.clone();
        let (value,) = self
            .run("increment_counter", async move {
                ::redis::pipe()
                    .atomic()
                    .cmd("INCR")
                    .arg(&key)
                    .cmd("PEXPIRE")
                    .arg(&key)
                    .arg(ttl_ms)
                    .ignore()
                    .query_async::<_, (u64,)>(&mut conn)
                    .await
            })
            .await?;
        Ok(value)
    }

    async fn read_counter(&self, key: &str, _now: Timestamp) -> Result<u64> {
        let key = self.counter_key(key);
        let mut conn = self.conn.clone();
        let value = self
            .run("read_counter", async move {
                ::redis::cmd("GET").arg(&key).query_async::<_, Option<u64>>(&mut conn).await
            })
            .await?;
        Ok(value.unwrap_or(0))
    }

    async fn increment_total(&self, name: &str) -> Result<u64> {
        let key = self.total_key(name);
        let mut conn = self.conn.clone();
        self.run("increment_total", async move {
            ::redis::cmd("INCR").arg(&key).query_async::<_, u64>(&mut conn).await
        })
        .await
    }

    async fn read_total(&self, name: &str) -> Result<u64> {
        let key = self.total_key(name);
        let mut conn = self.conn.clone();
        let value = self
            .run("read_total", async move {
                ::redis::cmd("GET").arg(&key).query_async::<_, Option<u64>>(&mut conn).await
            })
            .await?;
        Ok(value.unwrap_or(0))
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        self.run("ping", async move {
            ::redis::cmd("PING").query_async::<_, String>(&mut conn).await
        })
        .await
        .map(|_| ())
    }
}
