//! Output formatting and progress reporting

use blogprobe::{ScenarioResult, SuiteReport};
use console::{style, Style, StyledObject, Term};

/// Reports scenario outcomes on stderr
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
    /// Also print run details
    pub verbose: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            use_color,
            quiet,
            verbose: false,
        }
    }

    /// Enable run details
    #[must_use]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn line(&self, symbol: StyledObject<&str>, plain: &str, message: &str) {
        let prefix = if self.use_color {
            symbol.bold().to_string()
        } else {
            plain.to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.line(style("✓").green(), "PASS", message);
        }
    }

    /// Print a failure message, even in quiet mode
    pub fn failure(&self, message: &str) {
        self.line(style("✗").red(), "FAIL", message);
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if !self.quiet {
            self.line(style("⚠").yellow(), "WARN", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.line(style("ℹ").blue(), "INFO", message);
        }
    }

    /// Print a detail line, only when verbose
    pub fn detail(&self, message: &str) {
        if self.verbose && !self.quiet {
            let _ = self.term.write_line(&format!("    {message}"));
        }
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&styled);
    }

    /// One line per scenario, plus the failure detail
    pub fn scenario(&self, result: &ScenarioResult) {
        let line = format!(
            "{} ({:.2}s)",
            result.full_name(),
            result.duration_ms as f64 / 1000.0
        );
        match &result.failure {
            None => self.success(&line),
            Some(failure) => {
                self.failure(&line);
                let step = failure
                    .step
                    .as_deref()
                    .map(|s| format!(" at `{s}`"))
                    .unwrap_or_default();
                let _ = self
                    .term
                    .write_line(&format!("    {} failure{step}: {}", failure.kind, failure.message));
            }
        }
        if result.unexpected_dialogs > 0 {
            self.warning(&format!(
                "{} unexpected dialog(s) dismissed in {}",
                result.unexpected_dialogs,
                result.full_name()
            ));
        }
    }

    /// Every scenario, then the summary
    pub fn report(&self, report: &SuiteReport) {
        for result in &report.results {
            self.scenario(result);
        }
        self.summary(report);
    }

    /// Print the suite summary
    pub fn summary(&self, report: &SuiteReport) {
        let failed = report.failed_count();
        if self.quiet && failed == 0 {
            return;
        }

        let _ = self.term.write_line("");

        if !self.use_color {
            let _ = self.term.write_line(&report.summary());
            return;
        }

        let passed_style = Style::new().green().bold();
        let failed_style = Style::new().red().bold();
        let skipped_style = Style::new().yellow();

        let status = if failed > 0 {
            failed_style.apply_to("FAILED")
        } else {
            passed_style.apply_to("PASSED")
        };

        let _ = self.term.write_line(&format!(
            "{} {} scenarios in {:.2}s ({} passed, {} failed, {} skipped)",
            status,
            report.total(),
            report.duration().as_secs_f64(),
            passed_style.apply_to(report.passed_count()),
            if failed > 0 {
                failed_style.apply_to(failed).to_string()
            } else {
                failed.to_string()
            },
            skipped_style.apply_to(report.skipped)
        ));
    }
}
