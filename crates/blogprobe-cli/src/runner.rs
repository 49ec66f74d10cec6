//! Suite execution for the `run` and `list` commands

use crate::commands::{ListArgs, RunArgs};
use crate::config::{harness_config, CliConfig};
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use blogprobe::mock::MockBlogApp;
use blogprobe::{blog_app_suite, HarnessConfig, ScenarioRunner, SessionFactory, Suite, SuiteReport};
use std::path::Path;
use tracing::info;

/// The scenario file, or the built-in blog suite
pub fn load_suite(path: Option<&Path>) -> CliResult<Suite> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading scenarios");
            Ok(Suite::from_yaml_file(path)?)
        }
        None => Ok(blog_app_suite()),
    }
}

/// Full scenario names a run would select
pub fn list_scenarios(args: &ListArgs) -> CliResult<Vec<String>> {
    let suite = load_suite(args.scenarios.as_deref())?;
    let selection = match &args.filter {
        Some(filter) => HarnessConfig::default().with_filter(filter.clone()),
        None => HarnessConfig::default(),
    };
    Ok(suite
        .scenario_names()
        .into_iter()
        .filter(|name| selection.selects(name))
        .collect())
}

/// Runs a suite with the configured driver and reports on the console
#[derive(Debug)]
pub struct SuiteRunner {
    reporter: ProgressReporter,
}

impl SuiteRunner {
    /// Create a runner reporting according to the CLI configuration
    #[must_use]
    pub fn new(config: &CliConfig) -> Self {
        Self {
            reporter: ProgressReporter::new(
                config.color.should_color(),
                config.verbosity.is_quiet(),
            )
            .with_verbose(config.verbosity.is_verbose()),
        }
    }

    /// Run the suite; errors only when the harness itself cannot start
    pub async fn run(&self, args: &RunArgs) -> CliResult<SuiteReport> {
        let suite = load_suite(args.scenarios.as_deref())?;
        let config = harness_config(args)?;

        let report = if args.mock {
            let app = MockBlogApp::start().await?;
            self.reporter
                .info(&format!("mock blog application on {}", app.backend_url()));
            let config = HarnessConfig {
                frontend_url: app.frontend_url().to_string(),
                backend_url: app.backend_url(),
                ..config
            };
            self.execute(config, Box::new(app.session_factory()), &suite)
                .await?
        } else {
            let factory = browser_factory(args, &config).await?;
            self.execute(config, factory, &suite).await?
        };

        if let Some(path) = &args.report {
            report.write_json(path)?;
            self.reporter
                .info(&format!("report written to {}", path.display()));
        }
        Ok(report)
    }

    async fn execute(
        &self,
        config: HarnessConfig,
        factory: Box<dyn SessionFactory>,
        suite: &Suite,
    ) -> CliResult<SuiteReport> {
        self.reporter.header(&format!(
            "{} scenario(s) against {}",
            suite.scenario_count(),
            config.frontend_url
        ));
        self.reporter.detail(&format!(
            "backend {}, timeout {} ms, poll {} ms",
            config.backend_url, config.timeout_ms, config.poll_interval_ms
        ));
        let runner = ScenarioRunner::new(config, factory)?;
        let report = runner.run(suite).await;
        self.reporter.report(&report);
        Ok(report)
    }
}

#[cfg(feature = "browser")]
async fn browser_factory(
    args: &RunArgs,
    config: &HarnessConfig,
) -> CliResult<Box<dyn SessionFactory>> {
    let options = blogprobe::ChromiumOptions {
        headless: config.headless,
        executable: args
            .chromium
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned()),
        no_sandbox: args.no_sandbox,
    };
    Ok(Box::new(
        blogprobe::ChromiumSessionFactory::launch(options).await?,
    ))
}

#[cfg(not(feature = "browser"))]
async fn browser_factory(
    _args: &RunArgs,
    _config: &HarnessConfig,
) -> CliResult<Box<dyn SessionFactory>> {
    Err(CliError::invalid_argument(
        "this build has no browser support; pass --mock or rebuild with --features browser",
    ))
}

/// Map a finished report to the process outcome
pub fn outcome(report: &SuiteReport) -> CliResult<()> {
    if report.all_passed() {
        Ok(())
    } else {
        Err(CliError::ScenariosFailed {
            failed: report.failed_count(),
            total: report.total(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{ColorChoice, Verbosity};
    use std::io::Write;

    fn quiet() -> CliConfig {
        CliConfig::new()
            .with_verbosity(Verbosity::Quiet)
            .with_color(ColorChoice::Never)
    }

    #[test]
    fn test_default_suite() {
        let suite = load_suite(None).unwrap();
        assert_eq!(suite.scenario_count(), 8);
    }

    #[test]
    fn test_list_with_filter() {
        let names = list_scenarios(&ListArgs {
            scenarios: None,
            filter: Some("wrong credentials".to_string()),
        })
        .unwrap();
        assert_eq!(names, vec!["Login > fails with wrong credentials".to_string()]);
    }

    #[test]
    fn test_missing_scenario_file() {
        assert!(load_suite(Some(Path::new("/nonexistent/scenarios.yaml"))).is_err());
    }

    #[test]
    fn test_outcome() {
        assert!(outcome(&SuiteReport::default()).is_ok());
        let report = SuiteReport {
            results: vec![blogprobe::ScenarioResult::fail(
                "g",
                "s",
                blogprobe::Failure {
                    kind: blogprobe::FailureKind::Action,
                    step: None,
                    message: "boom".to_string(),
                },
            )],
            ..SuiteReport::default()
        };
        assert!(matches!(
            outcome(&report),
            Err(CliError::ScenariosFailed { failed: 1, total: 1 })
        ));
    }

    #[tokio::test]
    async fn test_mock_run_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let args = RunArgs {
            mock: true,
            report: Some(path.clone()),
            timeout_ms: Some(2_000),
            poll_interval_ms: Some(10),
            ..RunArgs::default()
        };
        let report = SuiteRunner::new(&quiet()).run(&args).await.unwrap();
        assert!(report.all_passed(), "{}", report.summary());
        let json = std::fs::read_to_string(path).unwrap();
        assert!(json.contains("only creator can see delete button"));
    }

    #[tokio::test]
    async fn test_mock_run_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
groups:
  - name: Blog app
    scenarios:
      - name: login form is shown
        steps:
          - {{ action: expect_visible, text: Log in to application }}
          - action: expect_logged_out
"#
        )
        .unwrap();
        let args = RunArgs {
            mock: true,
            scenarios: Some(file.path().to_path_buf()),
            ..RunArgs::default()
        };
        let report = SuiteRunner::new(&quiet()).run(&args).await.unwrap();
        assert_eq!(report.total(), 1);
        assert!(report.all_passed(), "{}", report.summary());
    }

    #[cfg(not(feature = "browser"))]
    #[tokio::test]
    async fn test_live_run_needs_browser_feature() {
        let err = SuiteRunner::new(&quiet())
            .run(&RunArgs::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument { .. }));
    }
}
