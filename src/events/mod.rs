//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by timers and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `PausableTimer` (through its scheduler), `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the scheduler's event listener (fans out to `SubscriberSet`),
//!   and any raw receiver from `Scheduler::subscribe_events`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
