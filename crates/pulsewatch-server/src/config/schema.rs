use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use pulsewatch_core::error::{PulseError, Result};

/// Presence window used when nothing overrides it.
pub const DEFAULT_PRESENCE_WINDOW_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PulseConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub telemetry: TelemetrySection,

    #[serde(default)]
    pub store: StoreSection,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            telemetry: TelemetrySection::default(),
            store: StoreSection::default(),
        }
    }
}

impl PulseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(PulseError::UnsupportedVersion);
        }
        self.server.validate()?;
        self.telemetry.validate()?;
        self.store.validate()?;
        Ok(())
    }

    /// Apply `PORT`, `REDIS_URL` and `PRESENCE_WINDOW_SECS` on top of the file.
    ///
    /// `env` is a lookup so tests can inject variables without touching the
    /// process environment.
    pub fn apply_env<F>(&mut self, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = env("PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|_| PulseError::BadConfig(format!("PORT is not a valid port: {port}")))?;
            let mut addr = self.server.listen_addr()?;
            addr.set_port(port);
            self.server.listen = addr.to_string();
        }

        if let Some(url) = env("REDIS_URL") {
            let url = url.trim();
            if !url.is_empty() {
                self.store.redis_url = Some(url.to_string());
            }
        }

        if let Some(secs) = env("PRESENCE_WINDOW_SECS") {
            self.telemetry.presence_window_secs = secs.trim().parse().map_err(|_| {
                PulseError::BadConfig(format!("PRESENCE_WINDOW_SECS is not a number: {secs}"))
            })?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Reported as `server` in `/ping`.
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            name: default_name(),
            version: default_version(),
        }
    }
}

impl ServerSection {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            PulseError::BadConfig(format!("server.listen must be a valid SocketAddr: {}", self.listen))
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if self.name.trim().is_empty() {
            return Err(PulseError::BadConfig("server.name must not be empty".into()));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:5000".into()
}
fn default_name() -> String {
    "pulsewatch".into()
}
fn default_version() -> String {
    env!("CARGO_PKG_VERSION").into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySection {
    #[serde(default = "default_presence_window_secs")]
    pub presence_window_secs: u64,
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            presence_window_secs: default_presence_window_secs(),
        }
    }
}

impl TelemetrySection {
    pub fn presence_window(&self) -> Duration {
        Duration::from_secs(self.presence_window_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=3600).contains(&self.presence_window_secs) {
            return Err(PulseError::BadConfig(
                "telemetry.presence_window_secs must be between 1 and 3600".into(),
            ));
        }
        Ok(())
    }
}

fn default_presence_window_secs() -> u64 {
    DEFAULT_PRESENCE_WINDOW_SECS
}

/// Which storage backend to run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    /// Redis when a URL is set and reachable, memory otherwise.
    #[default]
    Auto,
    Memory,
    /// Redis, failing startup if it cannot connect.
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    #[serde(default)]
    pub backend: BackendChoice,

    #[serde(default)]
    pub redis_url: Option<String>,

    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    #[serde(default = "default_op_timeout_ms")]
    pub op_timeout_ms: u64,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: BackendChoice::default(),
            redis_url: None,
            key_prefix: default_key_prefix(),
            op_timeout_ms: default_op_timeout_ms(),
        }
    }
}

impl StoreSection {
    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if !(50..=10000).contains(&self.op_timeout_ms) {
            return Err(PulseError::BadConfig(
                "store.op_timeout_ms must be between 50 and 10000".into(),
            ));
        }
        if self.backend == BackendChoice::Redis && self.redis_url.is_none() {
            return Err(PulseError::BadConfig(
                "store.backend is redis but store.redis_url is not set".into(),
            ));
        }
        if self.key_prefix.contains('*') {
            return Err(PulseError::BadConfig("store.key_prefix must not contain '*'".into()));
        }
        Ok(())
    }
}

fn default_key_prefix() -> String {
    "pulsewatch:".into()
}
fn default_op_timeout_ms() -> u64 {
    1000
}
