//! Result and error types for probar mocks.
//!
//! Errors raised by a mocked implementation are never wrapped here: they
//! unwind through the mock unchanged. These variants cover failures of the
//! mock machinery itself.

use thiserror::Error;

/// Result type for mock operations
pub type MockResult<T> = Result<T, MockError>;

/// Errors that can occur in probar mocks
#[derive(Debug, Error)]
pub enum MockError {
    /// `spy_on` was pointed at a property that is missing or not callable
    #[error("spy target must be a method: {name}")]
    InvalidTarget {
        /// Property name that was requested
        name: String,
    },

    /// Assertion against a recorded ledger failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Configuration was parsed but is not usable
    #[error("Invalid mock configuration: {message}")]
    InvalidConfig {
        /// Error message
        message: String,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MockError {
    /// Create an invalid target error
    #[must_use]
    pub fn invalid_target(name: impl Into<String>) -> Self {
        Self::InvalidTarget { name: name.into() }
    }

    /// Create an assertion failure
    #[must_use]
    pub fn assertion_failed(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
