//! # EventLoop: host-facing single-threaded runtime.
//!
//! Bundles a current-thread tokio runtime (time driver enabled) with a
//! [`Scheduler`], for hosts that are not already inside a tokio context.
//!
//! ```text
//! EventLoop::new(scheduler)
//!     └─► Builder::new_current_thread().enable_time().build()
//!
//! EventLoop::block_on(fut)
//!     └─► runtime.block_on(scheduler.run_until(fut))
//!
//! EventLoop::run_for(d)
//!     └─► block_on(async { sleep(d).await })
//! ```
//!
//! ## Rules
//! - Timer-driver futures (`sleep`, `timeout`, `interval`) must be created **inside**
//!   the future passed to `block_on`: building them outside the runtime panics with
//!   "there is no reactor running". Wrap them in `async { .. }` or use
//!   [`run_for`](EventLoop::run_for).
//! - Scheduling and timer operations (`start`, `pause`, ...) are fine outside
//!   `block_on`; they only run once the loop is driven.
//!
//! # Example
//! ```
//! use std::{cell::Cell, rc::Rc, time::Duration};
//! use pausable_timer::{EventLoop, PausableTimer, Scheduler};
//!
//! let event_loop = EventLoop::new(Scheduler::new()).expect("runtime");
//! let fired = Rc::new(Cell::new(0));
//! let counter = fired.clone();
//!
//! let timer = PausableTimer::new(event_loop.scheduler(), Duration::from_millis(5), false, move |_| {
//!     counter.set(counter.get() + 1);
//! });
//! timer.start();
//! event_loop.run_for(Duration::from_millis(20));
//!
//! assert_eq!(fired.get(), 1);
//! assert!(!timer.is_valid());
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};
use tokio::time;

use crate::core::scheduler::Scheduler;
use crate::error::RuntimeError;

/// A scheduler bound to its own current-thread runtime.
pub struct EventLoop {
    // Dropped before the runtime so pending registrations release their timers first.
    scheduler: Scheduler,
    runtime: Runtime,
}

impl EventLoop {
    /// Builds the runtime backing `scheduler`.
    pub fn new(scheduler: Scheduler) -> Result<Self, RuntimeError> {
        let runtime = Builder::new_current_thread().enable_time().build()?;
        Ok(Self { scheduler, runtime })
    }

    /// The scheduler driven by this loop.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Runs `future` to completion, driving every timer registered on the scheduler meanwhile.
    ///
    /// The runtime is only entered here, so `future` must not touch the timer driver
    /// before it is first polled: pass `async { sleep(d).await }`, not `sleep(d)`.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(self.scheduler.run_until(future))
    }

    /// Drives the scheduler for `duration` of event-loop time.
    pub fn run_for(&self, duration: Duration) {
        self.block_on(async move { time::sleep(duration).await });
    }
}
