//! # Runtime events emitted by timers and subscriber workers.
//!
//! The [`EventKind`] enum classifies event types across two categories:
//! - **Timer events**: state transitions of a [`PausableTimer`](crate::PausableTimer)
//!   (started, paused, resumed, fired, retired, invalidated)
//! - **Subscriber events**: delivery problems inside the subscriber fan-out
//!
//! The [`Event`] struct carries additional metadata such as timestamps, timer id,
//! labels, reasons, and delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use pausable_timer::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TimerPaused)
//!     .with_label("delay")
//!     .with_reason("will_background")
//!     .with_delay(Duration::from_secs(4));
//!
//! assert_eq!(ev.kind, EventKind::TimerPaused);
//! assert_eq!(ev.label.as_deref(), Some("delay"));
//! assert_eq!(ev.delay_ms, Some(4_000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::core::TimerId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `label`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `label`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Timer lifecycle events ===
    /// Timer left `Idle` and armed its first registration.
    ///
    /// Sets:
    /// - `timer`, `label`
    /// - `delay_ms`: time until the first fire
    /// - `reason`: `"instant"` when started through `instantly_start`
    TimerStarted,

    /// Timer was paused.
    ///
    /// Sets:
    /// - `timer`, `label`
    /// - `delay_ms`: remaining duration recorded at the pause
    /// - `reason`: who paused it (e.g., `"will_background"`), when known
    TimerPaused,

    /// Timer was resumed from `Paused`.
    ///
    /// Sets:
    /// - `timer`, `label`
    /// - `delay_ms`: remaining duration used for the new registration
    TimerResumed,

    /// Timer deadline was reached and its handler is about to run.
    ///
    /// Sets:
    /// - `timer`, `label`
    /// - `fires`: number of fires so far, this one included
    TimerFired,

    /// Non-repeating timer fired and reached its terminal state.
    ///
    /// Sets:
    /// - `timer`, `label`
    /// - `fires`: total number of fires
    TimerRetired,

    /// Timer was invalidated explicitly (or lost its scheduler).
    ///
    /// Sets:
    /// - `timer`, `label`
    /// - `reason`: optional detail (e.g., `"scheduler_gone"`)
    TimerInvalidated,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,

    /// Delay, remaining time, or interval in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (pause origin, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Number of fires observed so far.
    pub fires: Option<u64>,
    /// Timer the event refers to, if any.
    pub timer: Option<TimerId>,
    /// Timer label or subscriber name.
    pub label: Option<Arc<str>>,
    /// Event classification.
    pub kind: EventKind,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            kind,
            at: SystemTime::now(),
            delay_ms: None,
            reason: None,
            fires: None,
            timer: None,
            label: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a label (timer label or subscriber name).
    #[inline]
    pub fn with_label(mut self, label: impl Into<Arc<str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Attaches the timer id.
    #[inline]
    pub fn with_timer(mut self, id: TimerId) -> Self {
        self.timer = Some(id);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches the fire count.
    #[inline]
    pub fn with_fires(mut self, n: u64) -> Self {
        self.fires = Some(n);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_label(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_label(subscriber)
            .with_reason(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::TimerStarted);
        let b = Event::new(EventKind::TimerFired);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn delay_is_clamped_to_u32_millis() {
        let ev = Event::new(EventKind::TimerPaused).with_delay(Duration::from_secs(u64::MAX / 4));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }

    #[test]
    fn subscriber_helpers_set_label_and_kind() {
        let ev = Event::subscriber_overflow("audit", "full");
        assert_eq!(ev.kind, EventKind::SubscriberOverflow);
        assert_eq!(ev.label.as_deref(), Some("audit"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber=audit reason=full"));

        let ev = Event::subscriber_panicked("audit", "oops".into());
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
    }
}
