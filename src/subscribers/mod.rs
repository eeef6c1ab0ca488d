//! # Event subscribers for the timer runtime.
//!
//! This module provides the [`Subscribe`] trait and the internal `SubscriberSet` that
//! fans out events broadcast through the scheduler's event bus.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   PausableTimer ── publish(Event) ──► Bus ──► event listener (Scheduler)
//!                                                     │
//!                                                     └──► SubscriberSet::emit_arc
//!                                                            ┌────┴────┬─────────┐
//!                                                            ▼         ▼         ▼
//!                                                        LogWriter  Metrics   Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use pausable_timer::{Subscribe, Event, EventKind};
//! use async_trait::async_trait;
//!
//! struct FireCounter;
//!
//! #[async_trait]
//! impl Subscribe for FireCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::TimerFired {
//!             // increment counter
//!         }
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscribe::Subscribe;
pub(crate) use subscriber_set::SubscriberSet;
