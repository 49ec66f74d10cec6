//! Harness configuration.

use crate::assertion::RetryConfig;
use crate::locator::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};
use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default frontend URL (Vite dev server)
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";

/// Default backend URL
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3001";

/// Where the application lives and how patient the harness is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// URL the browser opens at the start of each scenario
    pub frontend_url: String,
    /// Base URL for the testing API
    pub backend_url: String,
    /// Ceiling for every bounded wait
    pub timeout_ms: u64,
    /// Delay between polls
    pub poll_interval_ms: u64,
    /// Run the browser headless
    pub headless: bool,
    /// Stop after the first failed scenario
    pub fail_fast: bool,
    /// Only run scenarios whose full name contains this substring
    pub filter: Option<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            headless: true,
            fail_fast: false,
            filter: None,
        }
    }
}

impl HarnessConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a YAML file; missing keys keep their defaults
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Parse YAML text
    ///
    /// # Errors
    ///
    /// Returns error if the text is not valid configuration
    pub fn from_yaml(text: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values make sense together
    ///
    /// # Errors
    ///
    /// Returns `Config` if a URL is empty or the timings are zero
    pub fn validate(&self) -> ProbeResult<()> {
        if self.frontend_url.trim().is_empty() {
            return Err(ProbeError::Config {
                message: "frontend_url must not be empty".to_string(),
            });
        }
        if self.backend_url.trim().is_empty() {
            return Err(ProbeError::Config {
                message: "backend_url must not be empty".to_string(),
            });
        }
        if self.timeout_ms == 0 || self.poll_interval_ms == 0 {
            return Err(ProbeError::Config {
                message: "timeout_ms and poll_interval_ms must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Set the frontend URL
    #[must_use]
    pub fn with_frontend_url(mut self, url: impl Into<String>) -> Self {
        self.frontend_url = url.into();
        self
    }

    /// Set the backend URL
    #[must_use]
    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into();
        self
    }

    /// Set the wait ceiling
    #[must_use]
    pub const fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Stop after the first failure
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Restrict to scenarios whose name contains `filter`
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Timing for pages opened under this config
    #[must_use]
    pub const fn retry(&self) -> RetryConfig {
        RetryConfig::new(Duration::from_millis(self.timeout_ms))
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
    }

    /// Whether a scenario's full name passes the filter
    #[must_use]
    pub fn selects(&self, full_name: &str) -> bool {
        self.filter
            .as_deref()
            .map_or(true, |f| crate::locator::text_matches(full_name, f))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.frontend_url, "http://localhost:5173");
        assert_eq!(config.backend_url, "http://localhost:3001");
        assert_eq!(config.retry().timeout, Duration::from_secs(10));
        assert!(config.headless);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = HarnessConfig::new()
            .with_backend_url("http://127.0.0.1:9000")
            .with_timeout_ms(250)
            .with_poll_interval_ms(10)
            .with_fail_fast(true)
            .with_filter("likes");
        assert_eq!(config.retry().poll_interval, Duration::from_millis(10));
        assert!(config.fail_fast);
        assert!(config.selects("blogs are listed by likes in descending order"));
        assert!(!config.selects("Login > succeeds with correct credentials"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = HarnessConfig::from_yaml("backend_url: http://api.test\ntimeout_ms: 500\n").unwrap();
        assert_eq!(config.backend_url, "http://api.test");
        assert_eq!(config.timeout_ms, 500);
        assert_eq!(config.frontend_url, DEFAULT_FRONTEND_URL);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = HarnessConfig::from_yaml("timeout_ms: 0\n").unwrap_err();
        assert!(matches!(err, ProbeError::Config { .. }));
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "frontend_url: http://ui.test").unwrap();
        writeln!(file, "fail_fast: true").unwrap();
        let config = HarnessConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.frontend_url, "http://ui.test");
        assert!(config.fail_fast);
    }
}
