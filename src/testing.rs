//! Shared helpers for timing tests running on tokio's paused clock.

use std::time::Duration;

use tokio::time::Instant;

/// Tolerance for comparing virtual instants; the timer wheel has millisecond ticks.
const SLACK: Duration = Duration::from_millis(2);

/// Asserts that `actual` lies in `[expected, expected + SLACK]`.
#[track_caller]
pub(crate) fn assert_at(actual: Instant, start: Instant, expected: Duration) {
    let elapsed = actual.saturating_duration_since(start);
    assert!(
        elapsed >= expected && elapsed <= expected + SLACK,
        "expected fire at {expected:?}, got {elapsed:?}"
    );
}

/// Asserts that a duration is within `SLACK` of `expected` (either side).
#[track_caller]
pub(crate) fn assert_near(actual: Duration, expected: Duration) {
    let diff = if actual > expected {
        actual - expected
    } else {
        expected - actual
    };
    assert!(diff <= SLACK, "expected ~{expected:?}, got {actual:?}");
}

/// Lets local tasks that were woken (listeners, registrations) run.
pub(crate) async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
