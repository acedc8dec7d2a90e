//! Fingerprint derivation vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;
use std::net::IpAddr;

use serde::Deserialize;

use pulsewatch_core::fingerprint::{fingerprint_request, resolve_origin, Fingerprint, FINGERPRINT_LEN};

#[derive(Debug, Deserialize)]
struct FingerprintVector {
    description: String,
    forwarded_for: Option<String>,
    peer: Option<String>,
    user_agent: Option<String>,
    expect: String,
}

fn load(name: &str) -> Vec<FingerprintVector> {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}

#[test]
fn fingerprint_vectors() {
    for v in load("fingerprints.json") {
        let peer: Option<IpAddr> = v.peer.as_deref().map(|p| p.parse().unwrap());
        let fp = fingerprint_request(v.forwarded_for.as_deref(), peer, v.user_agent.as_deref());
        assert_eq!(fp.as_str(), v.expect, "vector={}", v.description);
        assert_eq!(fp.as_str().len(), FINGERPRINT_LEN, "vector={}", v.description);
    }
}

#[test]
fn same_inputs_same_fingerprint() {
    let a = Fingerprint::derive("203.0.113.7", "Mozilla/5.0");
    let b = Fingerprint::derive("203.0.113.7", "Mozilla/5.0");
    let c = Fingerprint::derive("203.0.113.7", "curl/8.4.0");
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn forwarded_chain_trims_first_hop() {
    let peer: IpAddr = "10.0.0.9".parse().unwrap();
    assert_eq!(resolve_origin(Some(" 198.51.100.1 ,10.0.0.1"), Some(peer)), "198.51.100.1");
    assert_eq!(resolve_origin(Some(",10.0.0.1"), Some(peer)), "10.0.0.9");
    assert_eq!(resolve_origin(None, None), "unknown");
}

#[test]
fn empty_user_agent_counts_as_unknown() {
    let a = fingerprint_request(Some("192.0.2.1"), None, Some(""));
    let b = fingerprint_request(Some("192.0.2.1"), None, None);
    assert_eq!(a, b);
}
