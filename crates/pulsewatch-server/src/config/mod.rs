//! Server config loader (strict parsing + env overrides).

pub mod schema;

use std::fs;
use std::io::ErrorKind;

use pulsewatch_core::error::{PulseError, Result};

pub use schema::{
    BackendChoice, PulseConfig, ServerSection, StoreSection, TelemetrySection,
    DEFAULT_PRESENCE_WINDOW_SECS,
};

/// Config file read when `PULSEWATCH_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "pulsewatch.yaml";

pub fn load_from_str(s: &str) -> Result<PulseConfig> {
    let cfg: PulseConfig = serde_yaml::from_str(s)
        .map_err(|e| PulseError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Startup path: file if present (defaults otherwise), then env overrides.
pub fn load<F>(path: &str, env: F) -> Result<PulseConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = match fs::read_to_string(path) {
        Ok(s) => serde_yaml::from_str(&s)
            .map_err(|e| PulseError::BadConfig(format!("invalid yaml in {path}: {e}")))?,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(%path, "no config file, using defaults");
            PulseConfig::default()
        }
        Err(e) => return Err(PulseError::BadConfig(format!("read {path} failed: {e}"))),
    };
    cfg.apply_env(env)?;
    cfg.validate()?;
    Ok(cfg)
}
