//! Retry timing for auto-waiting actions and assertions.
//!
//! Every UI check is a suspend point: it polls until the condition holds or
//! the ceiling elapses, then fails rather than hanging.

use crate::locator::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Result of a single assertion check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssertionCheckResult {
    /// Assertion passed
    Pass,
    /// Assertion failed with a description of what was observed
    Fail(String),
}

impl AssertionCheckResult {
    /// Check if the result is a pass
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Check if the result is a fail
    #[must_use]
    pub const fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total timeout duration
    pub timeout: Duration,
    /// Interval between retry attempts
    pub poll_interval: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl RetryConfig {
    /// Create a new retry config with timeout
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Create a fast config (short timeout, fast polling)
    #[must_use]
    pub const fn fast() -> Self {
        Self {
            timeout: Duration::from_millis(500),
            poll_interval: Duration::from_millis(10),
        }
    }

    /// Timeout in whole milliseconds
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

/// Result of a successful retried check
#[derive(Debug, Clone, Copy)]
pub struct RetryResult {
    /// Number of attempts before success
    pub attempts: usize,
    /// Total duration of all attempts
    pub duration: Duration,
}

/// Clock for one polling loop.
///
/// ```ignore
/// let mut clock = PollClock::start(config);
/// loop {
///     if check().is_pass() { return Ok(clock.finish()); }
///     if clock.expired() { return Err(...); }
///     clock.pause().await;
/// }
/// ```
#[derive(Debug)]
pub struct PollClock {
    config: RetryConfig,
    start: Instant,
    attempts: usize,
}

impl PollClock {
    /// Start timing
    #[must_use]
    pub fn start(config: RetryConfig) -> Self {
        Self {
            config,
            start: Instant::now(),
            attempts: 1,
        }
    }

    /// Whether the ceiling has elapsed
    #[must_use]
    pub fn expired(&self) -> bool {
        self.start.elapsed() >= self.config.timeout
    }

    /// Sleep one poll interval, never past the deadline
    pub async fn pause(&mut self) {
        let remaining = self.config.timeout.saturating_sub(self.start.elapsed());
        tokio::time::sleep(self.config.poll_interval.min(remaining)).await;
        self.attempts += 1;
    }

    /// Attempts made so far
    #[must_use]
    pub const fn attempts(&self) -> usize {
        self.attempts
    }

    /// Summary of a successful loop
    #[must_use]
    pub fn finish(&self) -> RetryResult {
        RetryResult {
            attempts: self.attempts,
            duration: self.start.elapsed(),
        }
    }
}
