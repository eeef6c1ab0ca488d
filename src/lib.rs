//! # pausable-timer
//!
//! **pausable-timer** provides timers that can be paused and resumed without losing
//! track of how much time is left, plus a lifecycle-aware [`Delay`] that only counts
//! time while the host application is in the foreground.
//!
//! Everything runs on one single-threaded scheduling context (a tokio `LocalSet`).
//! Timer types are `!Send`, so they cannot leave that context by construction.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!   │PausableTimer │   │PausableTimer │   │    Delay     │◄── LifecycleSource
//!   │  (one-shot)  │   │ (repeating)  │   │(timer + sub) │    (WillBackground /
//!   └──────┬───────┘   └──────┬───────┘   └──────┬───────┘     DidForeground)
//!          │ schedule/cancel  │                  │
//!          ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Scheduler (LocalSet + event Bus)                                 │
//! │  - one registration per pending callback                          │
//! │  - select!(biased) { token.cancelled(), sleep_until(deadline) }   │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                │ Event { TimerStarted, TimerPaused, ... }
//!                                ▼
//!                       ┌────────────────────────┐
//!                       │    event listener      │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                           (per-sub queues)
//!                        ┌─────────┼─────────┐
//!                        ▼         ▼         ▼
//!                    worker1   worker2   workerN
//! ```
//!
//! ### Timer lifecycle
//! ```text
//!            start()                 pause()
//!   Idle ───────────────► Scheduled ─────────► Paused { remaining }
//!     │                     │  ▲ ◄──────────────── │ resume()
//!     │                     │  └── fire (repeats)  │
//!     │ invalidate()        │ fire (one-shot)      │ invalidate()
//!     │                     │ invalidate()         │
//!     └─────────────────────┴──────► Retired ◄─────┘
//! ```
//! Operations that do not apply to the current state are silent no-ops.
//!
//! ## Features
//! | Area              | Description                                                    | Key types / traits                      |
//! |-------------------|----------------------------------------------------------------|-----------------------------------------|
//! | **Scheduling**    | One-shot cancellable callbacks on a single context.            | [`Scheduler`], [`TimerHandle`]          |
//! | **Timers**        | Pause/resume with exact remaining time, repeating intervals.   | [`PausableTimer`], [`TimerState`]       |
//! | **Lifecycle**     | Delays that exclude background time.                           | [`Delay`], [`LifecycleSource`]          |
//! | **Subscriber API**| Hook into timer events (logging, metrics, custom subscribers). | [`Subscribe`], [`Event`]                |
//! | **Host loop**     | Drive the scheduler from synchronous code.                     | [`EventLoop`]                           |
//! | **Configuration** | Centralize runtime settings.                                   | [`Config`]                              |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use pausable_timer::{Config, EventLoop, PausableTimer, RuntimeError, Scheduler, TimerState};
//!
//! fn main() -> Result<(), RuntimeError> {
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn pausable_timer::Subscribe>> = {
//!         use pausable_timer::LogWriter;
//!         vec![Arc::new(LogWriter::default())]
//!     };
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn pausable_timer::Subscribe>> = Vec::new();
//!
//!     let scheduler = Scheduler::builder(Config::default())
//!         .with_subscribers(subs)
//!         .build();
//!     let event_loop = EventLoop::new(scheduler)?;
//!
//!     let timer = PausableTimer::new(event_loop.scheduler(), Duration::from_millis(20), false, |_| {
//!         println!("fired");
//!     });
//!     timer.start();
//!     timer.pause();
//!     timer.resume();
//!
//!     event_loop.run_for(Duration::from_millis(50));
//!     assert_eq!(timer.state(), TimerState::Retired);
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod lifecycle;
mod subscribers;
mod timers;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use crate::core::{Config, EventLoop, Scheduler, SchedulerBuilder, TimerHandle, TimerId, WeakScheduler};
pub use error::RuntimeError;
pub use events::{Event, EventKind};
pub use lifecycle::{LifecycleBus, LifecycleEvent, LifecycleSource, Subscription};
pub use subscribers::Subscribe;
pub use timers::{Delay, Handler, PausableTimer, TimerState, delay};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
