//! Scenario verdicts and suite reports.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Which phase of a scenario failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Reset, seeding, session start or setup login
    Setup,
    /// A UI action could not be performed
    Action,
    /// An expected UI condition was not observed
    Assertion,
}

impl FailureKind {
    /// Classify an error raised by a step
    #[must_use]
    pub const fn of_step_error(error: &ProbeError) -> Self {
        if error.is_setup() {
            Self::Setup
        } else if error.is_assertion() {
            Self::Assertion
        } else {
            Self::Action
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Setup => write!(f, "setup"),
            Self::Action => write!(f, "action"),
            Self::Assertion => write!(f, "assertion"),
        }
    }
}

/// Why a scenario failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Failed phase
    pub kind: FailureKind,
    /// Step label, when a step failed
    pub step: Option<String>,
    /// Error message
    pub message: String,
}

/// Outcome of one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Group name
    pub group: String,
    /// Scenario name
    pub name: String,
    /// Failure, if any
    pub failure: Option<Failure>,
    /// Wall-clock duration
    pub duration_ms: u64,
    /// Dialogs dismissed because nothing expected them
    pub unexpected_dialogs: usize,
}

impl ScenarioResult {
    /// Passing result
    #[must_use]
    pub fn pass(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            failure: None,
            duration_ms: 0,
            unexpected_dialogs: 0,
        }
    }

    /// Failing result
    #[must_use]
    pub fn fail(group: impl Into<String>, name: impl Into<String>, failure: Failure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::pass(group, name)
        }
    }

    /// Set duration
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = duration.as_millis() as u64;
        self
    }

    /// Set the unexpected dialog count
    #[must_use]
    pub const fn with_unexpected_dialogs(mut self, count: usize) -> Self {
        self.unexpected_dialogs = count;
        self
    }

    /// Whether the scenario passed
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.failure.is_none()
    }

    /// `"group > name"`
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} > {}", self.group, self.name)
    }
}

/// Results for a whole suite run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Results in run order
    pub results: Vec<ScenarioResult>,
    /// Scenarios not run because of fail-fast
    pub skipped: usize,
    /// Total duration
    pub duration_ms: u64,
}

impl SuiteReport {
    /// Check if all scenarios passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(ScenarioResult::passed)
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.passed()).count()
    }

    /// Get scenarios run
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Get failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioResult> {
        self.results.iter().filter(|r| !r.passed()).collect()
    }

    /// Find a result by scenario name
    #[must_use]
    pub fn result(&self, name: &str) -> Option<&ScenarioResult> {
        self.results.iter().find(|r| r.name == name)
    }

    /// Total duration
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        let status = if self.all_passed() { "PASSED" } else { "FAILED" };
        format!(
            "{status} {} scenarios in {:.2}s ({} passed, {} failed, {} skipped)",
            self.total(),
            self.duration().as_secs_f64(),
            self.passed_count(),
            self.failed_count(),
            self.skipped
        )
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write JSON to `path`
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the write fails
    pub fn write_json(&self, path: impl AsRef<Path>) -> ProbeResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
