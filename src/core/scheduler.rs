//! # Scheduler: one-shot callbacks on a single-threaded event loop.
//!
//! [`Scheduler`] turns `(duration, callback)` into a registration against a
//! [`LocalSet`] and hands back a cancellable [`TimerHandle`].
//!
//! ## Architecture
//! ```text
//! schedule(after, cb) ──► LocalSet::spawn_local(registration)
//!                                 │
//!                                 ▼
//!                  select! (biased) {
//!                      token.cancelled()     ──► drop cb (never runs)
//!                      sleep_until(deadline) ──► cb()
//!                  }
//!
//! cancel(&handle) ──► token.cancel()   (idempotent)
//! ```
//!
//! ## Rules
//! - Callbacks never run early; they may run late when the context is busy.
//! - Callbacks run on the context that scheduled them (`LocalSet`, `!Send` types).
//! - Cancellation is checked before the deadline branch, so a cancel issued after the
//!   deadline elapsed but before the registration was polled still suppresses the callback.
//! - Registrations only make progress while the scheduler is driven
//!   ([`Scheduler::run_until`] or [`EventLoop::block_on`](crate::EventLoop::block_on)).
//!
//! ## Ownership
//! The spawned registration owns the callback. Timers keep only a [`TimerHandle`]
//! (for cancellation) and a [`WeakScheduler`] (to re-arm), so no reference cycle
//! runs through the scheduler.

use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::LocalSet;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::core::config::Config;
use crate::events::{Bus, Event};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Roughly 30 years; deadlines that would overflow `Instant` are clamped here.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Identifier of a timer, unique per scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to a single pending callback, used for cancellation.
#[derive(Debug)]
pub struct TimerHandle {
    deadline: Instant,
    token: CancellationToken,
}

impl TimerHandle {
    /// Instant at which the callback becomes due.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left until the deadline, clamped at zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Returns true once the handle was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    #[inline]
    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }
}

struct Inner {
    local: LocalSet,
    bus: Bus,
    cfg: Config,
    next_id: Cell<u64>,
}

/// Single-context scheduler for one-shot callbacks.
///
/// Cheap to clone; all clones share the same [`LocalSet`] and event [`Bus`].
/// The type is `!Send`: every timer built on it lives on one thread by construction.
///
/// Callbacks that capture a `Scheduler` clone keep the scheduler alive for as long
/// as they are pending; capture a [`WeakScheduler`] instead to avoid that.
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<Inner>,
}

impl Scheduler {
    /// Creates a scheduler with the default [`Config`] and no subscribers.
    pub fn new() -> Self {
        SchedulerBuilder::new(Config::default()).build()
    }

    /// Starts building a scheduler with the given configuration.
    pub fn builder(cfg: Config) -> SchedulerBuilder {
        SchedulerBuilder::new(cfg)
    }

    /// Registers `callback` to run once, at least `after` from now.
    ///
    /// Scheduling is infallible; the registration runs while the scheduler is driven.
    pub fn schedule<F>(&self, after: Duration, callback: F) -> TimerHandle
    where
        F: FnOnce() + 'static,
    {
        let now = Instant::now();
        let deadline = now
            .checked_add(after)
            .unwrap_or_else(|| now + FAR_FUTURE);
        let token = CancellationToken::new();
        let guard = token.clone();

        self.inner.local.spawn_local(async move {
            let due = tokio::select! {
                biased;
                _ = guard.cancelled() => false,
                _ = time::sleep_until(deadline) => true,
            };
            if due {
                callback();
            }
        });

        TimerHandle { deadline, token }
    }

    /// Cancels a pending registration. Cancelling a fired or cancelled handle is a no-op.
    pub fn cancel(&self, handle: &TimerHandle) {
        handle.cancel();
    }

    /// Drives the scheduler's context until `future` completes.
    ///
    /// Pending callbacks and lifecycle listeners only run while this is awaited.
    pub async fn run_until<F: Future>(&self, future: F) -> F::Output {
        self.inner.local.run_until(future).await
    }

    /// Returns a non-owning reference to this scheduler.
    pub fn downgrade(&self) -> WeakScheduler {
        WeakScheduler {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Creates a raw receiver of timer events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// Configuration the scheduler was built with.
    pub fn config(&self) -> &Config {
        &self.inner.cfg
    }

    /// Spawns a local task on the scheduler's context.
    pub(crate) fn spawn_local<F>(&self, future: F)
    where
        F: Future<Output = ()> + 'static,
    {
        self.inner.local.spawn_local(future);
    }

    /// Allocates a fresh timer id.
    pub(crate) fn next_timer_id(&self) -> TimerId {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id.wrapping_add(1));
        TimerId(id)
    }

    /// Publishes an event built lazily; skipped when nobody listens.
    pub(crate) fn publish_with(&self, build: impl FnOnce() -> Event) {
        if !self.inner.bus.is_idle() {
            self.inner.bus.publish(build());
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("cfg", &self.inner.cfg)
            .finish_non_exhaustive()
    }
}

/// Non-owning reference to a [`Scheduler`].
#[derive(Clone, Default, Debug)]
pub struct WeakScheduler {
    inner: Weak<Inner>,
}

impl WeakScheduler {
    /// Returns the scheduler if it is still alive.
    pub fn upgrade(&self) -> Option<Scheduler> {
        self.inner.upgrade().map(|inner| Scheduler { inner })
    }
}

/// Builder for constructing a [`Scheduler`] with optional subscribers.
pub struct SchedulerBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SchedulerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive timer events through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the scheduler: event bus, local context, and subscriber workers.
    pub fn build(self) -> Scheduler {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let local = LocalSet::new();

        if !self.subscribers.is_empty() {
            let set = SubscriberSet::new(self.subscribers, bus.clone(), &local);
            let mut rx = bus.subscribe();
            local.spawn_local(async move {
                loop {
                    match rx.recv().await {
                        Ok(ev) => set.emit_arc(Arc::new(ev)),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    }
                }
            });
        }

        Scheduler {
            inner: Rc::new(Inner {
                local,
                bus,
                cfg: self.cfg,
                next_id: Cell::new(1),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_at, assert_near};
    use std::cell::RefCell;

    fn recorder() -> (Rc<RefCell<Vec<Instant>>>, impl Fn() -> Box<dyn FnOnce()>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let make = move || {
            let sink = sink.clone();
            Box::new(move || sink.borrow_mut().push(Instant::now())) as Box<dyn FnOnce()>
        };
        (log, make)
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_duration() {
        let scheduler = Scheduler::new();
        let (log, make) = recorder();
        let start = Instant::now();

        scheduler
            .run_until(async {
                let handle = scheduler.schedule(Duration::from_secs(3), make());
                assert_eq!(handle.deadline(), start + Duration::from_secs(3));
                time::sleep(Duration::from_secs(2)).await;
                assert!(log.borrow().is_empty());
                assert_near(handle.remaining(), Duration::from_secs(1));
                time::sleep(Duration::from_secs(5)).await;
            })
            .await;

        assert_eq!(log.borrow().len(), 1);
        assert_at(log.borrow()[0], start, Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_fire_and_is_idempotent() {
        let scheduler = Scheduler::new();
        let (log, make) = recorder();

        scheduler
            .run_until(async {
                let handle = scheduler.schedule(Duration::from_secs(1), make());
                scheduler.cancel(&handle);
                scheduler.cancel(&handle);
                assert!(handle.is_cancelled());
                time::sleep(Duration::from_secs(3)).await;
            })
            .await;

        assert!(log.borrow().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_deadline_but_before_poll_suppresses_callback() {
        let scheduler = Scheduler::new();
        let (log, make) = recorder();

        let handle = scheduler.schedule(Duration::from_millis(10), make());
        // Time moves on while the context is not being driven.
        time::advance(Duration::from_millis(50)).await;
        assert_eq!(handle.remaining(), Duration::ZERO);
        scheduler.cancel(&handle);

        scheduler
            .run_until(time::sleep(Duration::from_millis(10)))
            .await;
        assert!(log.borrow().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_a_fired_handle_is_a_noop() {
        let scheduler = Scheduler::new();
        let (log, make) = recorder();

        scheduler
            .run_until(async {
                let handle = scheduler.schedule(Duration::ZERO, make());
                time::sleep(Duration::from_millis(1)).await;
                scheduler.cancel(&handle);
            })
            .await;

        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn weak_scheduler_does_not_keep_it_alive() {
        let scheduler = Scheduler::new();
        let weak = scheduler.downgrade();
        assert!(weak.upgrade().is_some());
        drop(scheduler);
        assert!(weak.upgrade().is_none());
        assert!(WeakScheduler::default().upgrade().is_none());
    }

    #[test]
    fn timer_ids_are_unique() {
        let scheduler = Scheduler::new();
        let a = scheduler.next_timer_id();
        let b = scheduler.next_timer_id();
        assert_ne!(a, b);
    }
}
