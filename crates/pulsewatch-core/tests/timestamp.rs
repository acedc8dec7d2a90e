#![allow(clippy::unwrap_used)]

use std::time::Duration;

use pulsewatch_core::Timestamp;

#[test]
fn minute_bucket_is_calendar_aligned() {
    assert_eq!(Timestamp::from_secs(0).minute_bucket(), 0);
    assert_eq!(Timestamp::from_secs(59).minute_bucket(), 0);
    assert_eq!(Timestamp::from_secs(60).minute_bucket(), 1);
    assert_eq!(Timestamp::from_millis(119_999).minute_bucket(), 1);
}

#[test]
fn since_saturates_when_reversed() {
    let a = Timestamp::from_secs(100);
    let b = Timestamp::from_secs(130);
    assert_eq!(b.since(a), Duration::from_secs(30));
    assert_eq!(a.since(b), Duration::ZERO);
    assert_eq!(a.saturating_add(Duration::from_millis(1500)).as_millis(), 101_500);
}
