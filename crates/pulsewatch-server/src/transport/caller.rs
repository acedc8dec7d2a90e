use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap};

use pulsewatch_core::fingerprint::fingerprint_request;
use pulsewatch_core::Fingerprint;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Fingerprint the caller from `X-Forwarded-For`, the peer address, and
/// `User-Agent`. Headers that are not valid UTF-8 count as missing.
pub fn fingerprint_of(headers: &HeaderMap, peer: Option<&ConnectInfo<SocketAddr>>) -> Fingerprint {
    let forwarded = headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok());
    let user_agent = headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok());
    let peer_ip = peer.map(|ConnectInfo(addr)| addr.ip());
    fingerprint_request(forwarded, peer_ip, user_agent)
}
