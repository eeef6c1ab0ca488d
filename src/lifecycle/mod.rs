//! Host lifecycle signals consumed by [`Delay`](crate::Delay).
//!
//! ## Contents
//! - [`LifecycleEvent`] foreground/background transitions
//! - [`LifecycleSource`] the consumed contract (`is_foreground`, `subscribe`)
//! - [`Subscription`] one subscriber's receiver; drop or `unsubscribe` to detach
//! - [`LifecycleBus`] broadcast-backed source for hosts and tests

mod bus;
mod source;

pub use bus::LifecycleBus;
pub use source::{LifecycleEvent, LifecycleSource, Subscription};
