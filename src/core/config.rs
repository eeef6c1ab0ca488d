//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized settings for the scheduler and lifecycle bus.
//!
//! Config is used in two ways:
//! 1. **Scheduler creation**: `Scheduler::builder(config)`
//! 2. **Lifecycle source**: `LifecycleBus::from_config(&config)`
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1
//! - `lifecycle_capacity = 0` → clamped to 1
//!
//! # Example
//! ```
//! use pausable_timer::Config;
//!
//! let mut cfg = Config::default();
//! cfg.start_foreground = false;
//! cfg.lifecycle_capacity = 0;
//!
//! assert_eq!(cfg.lifecycle_capacity_clamped(), 1);
//! ```

/// Global configuration for the timer runtime.
///
/// ## Field semantics
/// - `bus_capacity`: Event bus ring buffer size (min 1)
/// - `lifecycle_capacity`: Lifecycle broadcast ring buffer size (min 1)
/// - `start_foreground`: Whether the host starts in the foreground
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the observability event bus ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` events will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Capacity of the lifecycle broadcast ring buffer.
    ///
    /// A delay whose subscription lags resynchronises with the current
    /// foreground state, so a small buffer is enough.
    pub lifecycle_capacity: usize,

    /// Initial foreground state of a [`LifecycleBus`](crate::LifecycleBus) built from this config.
    pub start_foreground: bool,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns a lifecycle channel capacity clamped to a minimum of 1.
    #[inline]
    pub fn lifecycle_capacity_clamped(&self) -> usize {
        self.lifecycle_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `lifecycle_capacity = 64`
    /// - `start_foreground = true`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            lifecycle_capacity: 64,
            start_foreground: true,
        }
    }
}
