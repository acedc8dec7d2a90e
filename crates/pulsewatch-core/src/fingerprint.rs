//! Caller fingerprinting.
//!
//! A fingerprint is a best-effort identity derived from where a request came
//! from and what client it declared. Callers behind one NAT or proxy with the
//! same client string collapse into one fingerprint; hash collisions are
//! tolerated at this length.

use std::fmt;
use std::net::IpAddr;

use sha2::{Digest, Sha256};

/// Hex characters kept from the digest.
pub const FINGERPRINT_LEN: usize = 16;

/// Placeholder for a missing origin or client string.
pub const UNKNOWN: &str = "unknown";

/// Opaque, fixed-length caller identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Derive from an origin address and a client-declared string.
    pub fn derive(origin: &str, client: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(origin.as_bytes());
        hasher.update(b":");
        hasher.update(client.as_bytes());
        let mut hex = format!("{:x}", hasher.finalize());
        hex.truncate(FINGERPRINT_LEN);
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve the caller origin: first `X-Forwarded-For` entry, else the peer.
pub fn resolve_origin(forwarded_for: Option<&str>, peer: Option<IpAddr>) -> String {
    let forwarded = forwarded_for
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match (forwarded, peer) {
        (Some(f), _) => f.to_string(),
        (None, Some(ip)) => ip.to_string(),
        (None, None) => UNKNOWN.to_string(),
    }
}

/// Full derivation from raw request inputs, defaulting anything missing.
pub fn fingerprint_request(
    forwarded_for: Option<&str>,
    peer: Option<IpAddr>,
    user_agent: Option<&str>,
) -> Fingerprint {
    let origin = resolve_origin(forwarded_for, peer);
    let client = user_agent.filter(|s| !s.is_empty()).unwrap_or(UNKNOWN);
    Fingerprint::derive(&origin, client)
}
