//! Mock configuration

use crate::result::{MockError, MockResult};
use serde::{Deserialize, Serialize};

/// Default display name for mocks created without one
pub const DEFAULT_MOCK_NAME: &str = "mock";

/// Per-mock configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// Display name used in log events and assertion messages
    pub name: String,
    /// Emit a trace event for every invocation
    pub trace_calls: bool,
    /// Attach completion observers to deferred return values
    pub capture_settlements: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_MOCK_NAME.to_string(),
            trace_calls: false,
            capture_settlements: true,
        }
    }
}

impl MockConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Enable or disable per-call trace events
    #[must_use]
    pub const fn with_trace_calls(mut self, trace_calls: bool) -> Self {
        self.trace_calls = trace_calls;
        self
    }

    /// Enable or disable settlement capture
    #[must_use]
    pub const fn with_capture_settlements(mut self, capture: bool) -> Self {
        self.capture_settlements = capture;
        self
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> MockResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> MockResult<()> {
        if self.name.trim().is_empty() {
            return Err(MockError::invalid_config("mock name must not be empty"));
        }
        Ok(())
    }
}
