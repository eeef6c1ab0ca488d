//! Timers built on the [`Scheduler`](crate::Scheduler).
//!
//! ## Contents
//! - [`PausableTimer`] one-shot or repeating timer that can be paused and resumed
//! - [`TimerState`] observable lifecycle of a timer
//! - [`Delay`] / [`delay`] fire-once callbacks that only count foreground time

mod delay;
mod pausable;

pub use delay::{Delay, delay};
pub use pausable::{Handler, PausableTimer, TimerState};
