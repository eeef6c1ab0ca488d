//! Runtime core: configuration, scheduling primitive, and host event loop.
//!
//! Internal modules:
//! - [`config`]: global settings (bus capacities, initial foreground state);
//! - [`scheduler`]: one-shot callbacks on a `LocalSet`, cancellable handles, event bus wiring;
//! - [`event_loop`]: current-thread runtime that drives a scheduler from synchronous code.

mod config;
mod event_loop;
mod scheduler;

pub use config::Config;
pub use event_loop::EventLoop;
pub use scheduler::{Scheduler, SchedulerBuilder, TimerHandle, TimerId, WeakScheduler};
