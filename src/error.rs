//! Error types used by the timer runtime.
//!
//! Timer and delay operations never fail: misuse (pausing an idle timer,
//! resuming a running one, touching a retired one) is a silent no-op.
//! The only fallible step is building the host event loop, reported as [`RuntimeError`].

use thiserror::Error;

/// # Errors produced while setting up the timer runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The single-threaded tokio runtime backing [`EventLoop`](crate::EventLoop) could not be built.
    #[error("failed to build event loop: {0}")]
    Build(#[from] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use pausable_timer::RuntimeError;
    ///
    /// let err = RuntimeError::Build(std::io::Error::other("no timer driver"));
    /// assert_eq!(err.as_label(), "runtime_build_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Build(_) => "runtime_build_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::Build(err) => format!("event loop build failed: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert_into_build() {
        let err: RuntimeError = std::io::Error::other("boom").into();
        assert_eq!(err.as_label(), "runtime_build_failed");
        assert!(err.as_message().contains("boom"));
        assert!(err.to_string().starts_with("failed to build event loop"));
    }
}
