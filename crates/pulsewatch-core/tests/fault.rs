#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use pulsewatch_core::health::{FaultScenario, FaultSwitch, HealthVerdict, MetricsSnapshot};

#[test]
fn known_labels_map_to_canned_messages() {
    let cases = [
        ("database", "Database connection pool exhausted"),
        ("memory", "Memory usage critical - 95% used"),
        ("disk", "Disk space critical - 98% full"),
        ("api", "External API timeout - payment gateway unreachable"),
        ("external-api", "External API timeout - payment gateway unreachable"),
        ("CPU", "CPU usage critical - 99% sustained load"),
    ];
    for (label, msg) in cases {
        assert_eq!(FaultScenario::from_label(label).message(), msg, "label={label}");
    }
}

#[test]
fn unknown_label_is_invalid_but_recoverable() {
    let err = FaultScenario::parse("meteor").expect_err("must fail");
    assert_eq!(err.code().as_str(), "INVALID_INPUT");

    let s = FaultScenario::from_label("meteor");
    assert_eq!(s, FaultScenario::Unknown);
    assert_eq!(s.message(), "Unknown critical error");
}

#[test]
fn switch_keeps_latest_and_clears_idempotently() {
    let sw = FaultSwitch::new();
    assert!(sw.current().is_none());

    sw.set(FaultScenario::Disk);
    sw.set(FaultScenario::Memory);
    let f = sw.current().unwrap();
    assert_eq!(f.scenario, FaultScenario::Memory);
    assert_eq!(f.message, "Memory usage critical - 95% used");

    sw.clear();
    sw.clear();
    assert!(sw.current().is_none());
}

#[test]
fn verdict_accessors() {
    let ok = HealthVerdict::Healthy;
    assert!(ok.is_healthy());
    assert_eq!(ok.status(), "healthy");
    assert!(ok.code().is_none() && ok.message().is_none());

    let bad = HealthVerdict::critical("SIMULATED_ERROR", "Disk space critical - 98% full");
    assert_eq!(bad.status(), "critical");
    assert_eq!(bad.code(), Some("SIMULATED_ERROR"));
    assert_eq!(bad.to_string(), "CRITICAL(SIMULATED_ERROR: Disk space critical - 98% full)");
}

#[test]
fn snapshot_serializes_with_wire_names() {
    let snap = MetricsSnapshot {
        active_count: 3,
        rate_per_minute: 7,
        total_transactions: 42,
        uptime_seconds: 120,
        mean_latency_ms: 1.25,
    };
    let v = serde_json::to_value(snap).unwrap();
    assert_eq!(v["connected_users"], 3);
    assert_eq!(v["transactions_per_minute"], 7);
    assert_eq!(v["total_transactions"], 42);
    assert_eq!(v["uptime_seconds"], 120);
    assert_eq!(v["response_time_ms"], 1.25);
}
