//! # Delay: one-shot callback that only counts foreground time.
//!
//! A [`Delay`] owns a non-repeating [`PausableTimer`] and a lifecycle
//! [`Subscription`]. Time spent while the host is in the background does not count.
//!
//! ## Flow
//! ```text
//! Delay::new(duration, cb)
//!   ├─► subscribe to LifecycleSource (held by the delay)
//!   ├─► timer.start()
//!   ├─► !is_foreground()  ──► timer.pause()
//!   └─► spawn listener (local task):
//!         loop {
//!           WillBackground ──► timer.pause()
//!           DidForeground  ──► timer.resume()
//!           Lagged(_)      ──► resync with is_foreground()
//!           Closed         ──► unsubscribe, keep state, wait for retire
//!           retired        ──► exit
//!         }
//!
//! fire ──► unsubscribe + retire ──► cb()              (exactly once)
//! invalidate / drop ──► timer.invalidate() + unsubscribe + retire (cb never runs)
//! ```
//!
//! ## Ownership
//! - The pending lifecycle read (and with it the subscription) lives in the delay,
//!   so firing or invalidating releases the subscription synchronously.
//! - The listener task holds the delay's state, so a [`detach`](Delay::detach)ed
//!   delay stays alive until it fires or is torn down with its scheduler, even
//!   after its lifecycle source closed.
//! - The timer's handler only holds a weak reference back to the delay.

use std::cell::RefCell;
use std::fmt;
use std::future::poll_fn;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll, ready};
use std::time::Duration;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::core::Scheduler;
use crate::lifecycle::{LifecycleEvent, LifecycleSource, Subscription};
use crate::timers::pausable::PausableTimer;

type Callback = Box<dyn FnOnce()>;
type LifecycleMsg = Result<LifecycleEvent, RecvError>;

/// One outstanding read; owns the subscription while it waits.
type PendingRead = LocalBoxFuture<'static, (LifecycleMsg, Subscription)>;

async fn next_event(mut subscription: Subscription) -> (LifecycleMsg, Subscription) {
    let msg = subscription.recv().await;
    (msg, subscription)
}

struct DelayCore {
    timer: PausableTimer,
    callback: RefCell<Option<Callback>>,
    /// `None` once unsubscribed.
    lifecycle: RefCell<Option<PendingRead>>,
    /// Cancelled once the delay fired or was invalidated; stops the listener.
    retired: CancellationToken,
}

impl DelayCore {
    fn on_lifecycle(&self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::WillBackground => self.timer.pause_with(Some(event.as_label())),
            LifecycleEvent::DidForeground => self.timer.resume_with(Some(event.as_label())),
        }
    }

    fn resync(&self, foreground: bool) {
        if foreground {
            self.timer.resume_with(Some("resync"));
        } else {
            self.timer.pause_with(Some("resync"));
        }
    }

    /// Polls the pending read and queues the next one; `None` once unsubscribed.
    fn poll_lifecycle(&self, cx: &mut Context<'_>) -> Poll<Option<LifecycleMsg>> {
        let mut slot = self.lifecycle.borrow_mut();
        let Some(pending) = slot.as_mut() else {
            return Poll::Ready(None);
        };
        let (msg, subscription) = ready!(pending.poll_unpin(cx));
        *slot = Some(next_event(subscription).boxed_local());
        Poll::Ready(Some(msg))
    }

    fn unsubscribe(&self) {
        let pending = self.lifecycle.borrow_mut().take();
        drop(pending);
    }

    fn retire(&self) {
        self.unsubscribe();
        self.retired.cancel();
    }

    fn invalidate(&self) {
        self.timer.invalidate();
        self.retire();
        // Dropped outside the borrow: the callback's captures may reach back here.
        let callback = self.callback.borrow_mut().take();
        drop(callback);
    }
}

/// Fire-once delay that excludes time spent in the background.
///
/// Dropping a `Delay` invalidates it; use [`detach`](Delay::detach) (or [`delay`])
/// for fire-and-forget.
pub struct Delay {
    core: Option<Rc<DelayCore>>,
}

impl Delay {
    /// Starts counting `duration` of foreground time, then runs `callback` once.
    ///
    /// If the host is not in the foreground right now, the delay starts paused.
    pub fn new<F>(
        scheduler: &Scheduler,
        lifecycle: Rc<dyn LifecycleSource>,
        duration: Duration,
        callback: F,
    ) -> Self
    where
        F: FnOnce() + 'static,
    {
        let subscription = lifecycle.subscribe();
        let core = Rc::new_cyclic(|weak: &Weak<DelayCore>| {
            let weak = weak.clone();
            DelayCore {
                timer: PausableTimer::labeled(scheduler, "delay", duration, false, move |_| {
                    if let Some(core) = weak.upgrade() {
                        core.retire();
                        let callback = core.callback.borrow_mut().take();
                        if let Some(callback) = callback {
                            callback();
                        }
                    }
                }),
                callback: RefCell::new(Some(Box::new(callback))),
                lifecycle: RefCell::new(Some(next_event(subscription).boxed_local())),
                retired: CancellationToken::new(),
            }
        });

        core.timer.start();
        if !lifecycle.is_foreground() {
            core.timer.pause_with(Some("started_in_background"));
        }
        scheduler.spawn_local(listen(Rc::clone(&core), lifecycle));

        Self { core: Some(core) }
    }

    /// Cancels the delay and unsubscribes right away: the callback will never run.
    /// Safe to call repeatedly.
    pub fn invalidate(&self) {
        if let Some(core) = &self.core {
            core.invalidate();
        }
    }

    /// True until the delay fired or was invalidated.
    pub fn is_valid(&self) -> bool {
        self.core.as_ref().is_some_and(|core| core.timer.is_valid())
    }

    /// True while the delay is not counting (host in the background).
    pub fn is_paused(&self) -> bool {
        self.core.as_ref().is_some_and(|core| core.timer.is_paused())
    }

    /// Time left, as recorded when the delay was last paused.
    pub fn remaining(&self) -> Option<Duration> {
        self.core.as_ref().and_then(|core| core.timer.remaining())
    }

    /// Gives up ownership: the delay keeps running and fires on its own.
    ///
    /// Until it fires, only scheduler teardown stops it.
    pub fn detach(mut self) {
        self.core = None;
    }
}

impl Drop for Delay {
    fn drop(&mut self) {
        self.invalidate();
    }
}

impl fmt::Debug for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.core {
            Some(core) => f.debug_struct("Delay").field("timer", &core.timer).finish(),
            None => f.debug_struct("Delay").field("detached", &true).finish(),
        }
    }
}

/// Starts a [`Delay`] and detaches it (fire-and-forget).
///
/// # Example
/// ```
/// use std::{cell::Cell, rc::Rc, time::Duration};
/// use pausable_timer::{LifecycleBus, Scheduler, delay};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let scheduler = Scheduler::new();
/// let lifecycle = Rc::new(LifecycleBus::default());
/// let done = Rc::new(Cell::new(false));
/// let flag = done.clone();
///
/// delay(&scheduler, lifecycle, Duration::from_millis(10), move || flag.set(true));
/// scheduler.run_until(tokio::time::sleep(Duration::from_millis(30))).await;
/// assert!(done.get());
/// # }
/// ```
pub fn delay<F>(
    scheduler: &Scheduler,
    lifecycle: Rc<dyn LifecycleSource>,
    duration: Duration,
    callback: F,
) where
    F: FnOnce() + 'static,
{
    Delay::new(scheduler, lifecycle, duration, callback).detach();
}

/// Forwards lifecycle transitions to the delay's timer, then holds the delay until it retires.
async fn listen(core: Rc<DelayCore>, lifecycle: Rc<dyn LifecycleSource>) {
    let retired = core.retired.clone();
    loop {
        let msg = tokio::select! {
            biased;
            _ = retired.cancelled() => break,
            msg = poll_fn(|cx| core.poll_lifecycle(cx)) => msg,
        };
        match msg {
            Some(Ok(event)) => core.on_lifecycle(event),
            Some(Err(RecvError::Lagged(_))) => core.resync(lifecycle.is_foreground()),
            Some(Err(RecvError::Closed)) | None => break,
        }
    }
    core.unsubscribe();
    // A closed source leaves the timer as it was; it still has to fire or be invalidated.
    retired.cancelled().await;
}
