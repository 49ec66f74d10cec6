//! Result and error types for blogprobe.

use thiserror::Error;

/// Result type for blogprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving a scenario
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Page error (driver-level failure)
    #[error("Page error: {message}")]
    PageError {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Backend setup call failed (reset or seed)
    #[error("Setup call {endpoint} failed: {message}")]
    Setup {
        /// Endpoint that was called
        endpoint: String,
        /// Error message
        message: String,
    },

    /// Locator never resolved to an actionable element
    #[error("Timed out after {ms}ms waiting for {locator}")]
    Timeout {
        /// Locator description
        locator: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// More than one visible element matched an action locator
    #[error("Strict mode violation: {locator} resolved to {count} visible elements")]
    StrictModeViolation {
        /// Locator description
        locator: String,
        /// Number of visible matches
        count: usize,
    },

    /// Expected UI condition was never observed
    #[error("Assertion failed after {timeout_ms}ms: expected {expected}, got {actual}")]
    AssertionTimeout {
        /// Expected condition
        expected: String,
        /// Last observed state
        actual: String,
        /// Ceiling that elapsed
        timeout_ms: u64,
    },

    /// Dialog did not match the armed handler
    #[error("Unexpected dialog: {message}")]
    UnexpectedDialog {
        /// Error message
        message: String,
    },

    /// Input simulation error
    #[error("Input simulation failed: {message}")]
    InputError {
        /// Error message
        message: String,
    },

    /// Invalid state error (operation called in wrong state)
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// Scenario file or configuration could not be parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create a setup error for an endpoint
    #[must_use]
    pub fn setup(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Setup {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a page error
    #[must_use]
    pub fn page(message: impl Into<String>) -> Self {
        Self::PageError {
            message: message.into(),
        }
    }

    /// Whether this error came from backend setup
    #[must_use]
    pub const fn is_setup(&self) -> bool {
        matches!(self, Self::Setup { .. })
    }

    /// Whether this error is an assertion verdict (as opposed to a broken action)
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(
            self,
            Self::AssertionTimeout { .. } | Self::UnexpectedDialog { .. }
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_error_display() {
        let err = ProbeError::setup("/api/testing/reset", "connection refused");
        let text = err.to_string();
        assert!(text.contains("/api/testing/reset"));
        assert!(text.contains("connection refused"));
        assert!(err.is_setup());
        assert!(!err.is_assertion());
    }

    #[test]
    fn test_assertion_timeout_display() {
        let err = ProbeError::AssertionTimeout {
            expected: "text \"Wrong credentials\" visible".to_string(),
            actual: "no matching element".to_string(),
            timeout_ms: 10_000,
        };
        let text = err.to_string();
        assert!(text.contains("10000ms"));
        assert!(text.contains("Wrong credentials"));
        assert!(err.is_assertion());
    }

    #[test]
    fn test_strict_violation_display() {
        let err = ProbeError::StrictModeViolation {
            locator: "role=button[name=\"view\"]".to_string(),
            count: 3,
        };
        assert!(err.to_string().contains("3 visible elements"));
    }

    #[test]
    fn test_yaml_error_converts() {
        let parse: Result<Vec<u32>, _> = serde_yaml_ng::from_str("not: [a list");
        let err: ProbeError = parse.unwrap_err().into();
        assert!(matches!(err, ProbeError::Yaml(_)));
    }
}
