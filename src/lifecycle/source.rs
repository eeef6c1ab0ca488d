//! # Lifecycle-event source contract.
//!
//! The host application reports foreground/background transitions through a
//! [`LifecycleSource`]. Delays consume it; they never own it.
//!
//! ## Contract
//! - `is_foreground()` reports the current state.
//! - `subscribe()` returns an independent [`Subscription`] that observes every
//!   transition **after** the call, in chronological order.
//! - Events are delivered on the scheduler's context (the subscription is awaited by
//!   a local task), so delivery never races timer operations.
//! - Dropping (or [`unsubscribe`](Subscription::unsubscribe)-ing) a subscription
//!   detaches it; other subscribers are unaffected.

use tokio::sync::broadcast::{self, error::RecvError};

/// A foreground/background transition of the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The application is about to leave the foreground.
    WillBackground,
    /// The application became active again.
    DidForeground,
}

impl LifecycleEvent {
    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            LifecycleEvent::WillBackground => "will_background",
            LifecycleEvent::DidForeground => "did_foreground",
        }
    }
}

/// Source of lifecycle events, injected into every [`Delay`](crate::Delay).
pub trait LifecycleSource: 'static {
    /// Whether the host application is currently in the foreground.
    fn is_foreground(&self) -> bool;

    /// Starts observing transitions that happen after this call.
    fn subscribe(&self) -> Subscription;
}

/// One subscriber's view of a lifecycle source.
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<LifecycleEvent>,
}

impl Subscription {
    /// Wraps a broadcast receiver.
    pub fn new(rx: broadcast::Receiver<LifecycleEvent>) -> Self {
        Self { rx }
    }

    /// Waits for the next transition.
    ///
    /// - `Err(RecvError::Lagged(n))`: `n` transitions were dropped; the caller should
    ///   resynchronise with [`LifecycleSource::is_foreground`].
    /// - `Err(RecvError::Closed)`: the source is gone; no more events will arrive.
    pub async fn recv(&mut self) -> Result<LifecycleEvent, RecvError> {
        self.rx.recv().await
    }

    /// Stops observing the source.
    pub fn unsubscribe(self) {
        drop(self);
    }
}
