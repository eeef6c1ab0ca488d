//! # In-process lifecycle source.
//!
//! [`LifecycleBus`] is a thin wrapper around [`tokio::sync::broadcast`] plus the
//! current foreground flag. Hosts call [`will_background`](LifecycleBus::will_background)
//! and [`did_foreground`](LifecycleBus::did_foreground) from their platform hooks;
//! tests use it directly as a fake source.
//!
//! ## Rules
//! - **State first**: the flag is updated before the event is broadcast, so a
//!   subscriber resynchronising on lag sees the new state.
//! - **Transitions only**: signalling the current state again is ignored (returns `false`).
//! - **Bounded capacity**: slow subscribers observe `Lagged(n)` and skip `n` oldest events.
//! - **Cloneable**: clones share the channel and the flag.
//! - **Thread-safe signalling**: `LifecycleBus` is `Send + Sync`, so platform hooks
//!   may signal from their own thread. Delays still receive events on the
//!   scheduler's context.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;

use crate::core::Config;
use crate::lifecycle::source::{LifecycleEvent, LifecycleSource, Subscription};

/// Broadcast lifecycle source with a shared foreground flag.
#[derive(Clone, Debug)]
pub struct LifecycleBus {
    tx: broadcast::Sender<LifecycleEvent>,
    foreground: Arc<AtomicBool>,
}

impl LifecycleBus {
    /// Creates a bus with the given channel capacity (min 1) and initial state.
    pub fn new(capacity: usize, foreground: bool) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            foreground: Arc::new(AtomicBool::new(foreground)),
        }
    }

    /// Creates a bus using `lifecycle_capacity` and `start_foreground` from `cfg`.
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.lifecycle_capacity_clamped(), cfg.start_foreground)
    }

    /// Signals that the host is leaving the foreground.
    ///
    /// Returns `false` (and broadcasts nothing) if it already was in the background.
    pub fn will_background(&self) -> bool {
        self.transition(false, LifecycleEvent::WillBackground)
    }

    /// Signals that the host became active.
    ///
    /// Returns `false` (and broadcasts nothing) if it already was in the foreground.
    pub fn did_foreground(&self) -> bool {
        self.transition(true, LifecycleEvent::DidForeground)
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn transition(&self, foreground: bool, event: LifecycleEvent) -> bool {
        if self.foreground.swap(foreground, Ordering::AcqRel) == foreground {
            return false;
        }
        let _ = self.tx.send(event);
        true
    }
}

impl Default for LifecycleBus {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl LifecycleSource for LifecycleBus {
    fn is_foreground(&self) -> bool {
        self.foreground.load(Ordering::Acquire)
    }

    fn subscribe(&self) -> Subscription {
        Subscription::new(self.tx.subscribe())
    }
}
