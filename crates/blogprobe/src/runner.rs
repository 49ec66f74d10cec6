//! Scenario runner.
//!
//! Every scenario runs through the same phases:
//!
//! ```text
//!   reset ─▶ seed users ─▶ open session ─▶ goto frontend ─▶ [setup login]
//!     ─▶ steps ─▶ close session
//! ```
//!
//! The reset happens here rather than in scenarios, so no scenario can start
//! from another one's leftovers. A failure fails only its own scenario.

use crate::auth::{logged_in_text, AuthState, LOGIN_HEADING};
use crate::config::HarnessConfig;
use crate::helpers;
use crate::locator::Locator;
use crate::page::Page;
use crate::report::{Failure, FailureKind, ScenarioResult, SuiteReport};
use crate::result::{ProbeError, ProbeResult};
use crate::scenario::{Scenario, ScenarioGroup, Setup, Step, Suite};
use crate::seed::SeedClient;
use crate::session::SessionFactory;
use std::time::Instant;
use tracing::{debug, info, warn};

/// CSS locator for blog entries in the list
pub const BLOG_ENTRY: &str = ".blog";

/// Runs suites against one backend and one session factory
pub struct ScenarioRunner {
    config: HarnessConfig,
    seed: SeedClient,
    factory: Box<dyn SessionFactory>,
}

impl std::fmt::Debug for ScenarioRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioRunner")
            .field("config", &self.config)
            .field("factory", &self.factory.name())
            .finish()
    }
}

impl ScenarioRunner {
    /// Create a runner
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid
    pub fn new(config: HarnessConfig, factory: Box<dyn SessionFactory>) -> ProbeResult<Self> {
        config.validate()?;
        let seed = SeedClient::new(&config.backend_url)?;
        Ok(Self {
            config,
            seed,
            factory,
        })
    }

    /// Configuration in effect
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run every selected scenario, in order
    pub async fn run(&self, suite: &Suite) -> SuiteReport {
        let start = Instant::now();
        let selected: Vec<(&ScenarioGroup, &Scenario)> = suite
            .groups
            .iter()
            .flat_map(|g| g.scenarios.iter().map(move |s| (g, s)))
            .filter(|(g, s)| self.config.selects(&g.full_name(s)))
            .collect();
        info!(
            scenarios = selected.len(),
            driver = self.factory.name(),
            "running suite"
        );

        let mut report = SuiteReport::default();
        for (index, (group, scenario)) in selected.iter().enumerate() {
            let result = self.run_scenario(group, scenario).await;
            let failed = !result.passed();
            report.results.push(result);
            if failed && self.config.fail_fast {
                report.skipped = selected.len() - index - 1;
                warn!(skipped = report.skipped, "fail-fast: stopping suite");
                break;
            }
        }
        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            passed = report.passed_count(),
            failed = report.failed_count(),
            "suite finished"
        );
        report
    }

    /// Run one scenario from a clean backend
    pub async fn run_scenario(&self, group: &ScenarioGroup, scenario: &Scenario) -> ScenarioResult {
        let start = Instant::now();
        let full_name = group.full_name(scenario);
        info!(scenario = %full_name, "running scenario");

        let mut page = match self.prepare(&group.setup).await {
            Ok(page) => page,
            Err(e) => {
                warn!(scenario = %full_name, error = %e, "setup failed");
                let failure = Failure {
                    kind: FailureKind::Setup,
                    step: None,
                    message: e.to_string(),
                };
                return ScenarioResult::fail(&group.name, &scenario.name, failure)
                    .with_duration(start.elapsed());
            }
        };

        let outcome = run_steps(&mut page, &scenario.steps).await;
        let unexpected = page.dialogs().unexpected().len();
        if let Err(e) = page.close().await {
            warn!(scenario = %full_name, error = %e, "failed to close session");
        }

        let result = match outcome {
            Ok(()) => {
                info!(scenario = %full_name, "passed");
                ScenarioResult::pass(&group.name, &scenario.name)
            }
            Err((step, e)) => {
                let kind = FailureKind::of_step_error(&e);
                warn!(scenario = %full_name, step = %step.label(), %kind, error = %e, "failed");
                let failure = Failure {
                    kind,
                    step: Some(step.label()),
                    message: e.to_string(),
                };
                ScenarioResult::fail(&group.name, &scenario.name, failure)
            }
        };
        result
            .with_duration(start.elapsed())
            .with_unexpected_dialogs(unexpected)
    }

    async fn prepare(&self, setup: &Setup) -> ProbeResult<Page> {
        self.seed.apply(&setup.users).await?;
        let mut page = self.factory.open(self.config.retry()).await?;
        match self.enter(&mut page, setup).await {
            Ok(()) => Ok(page),
            Err(e) => {
                if let Err(close) = page.close().await {
                    warn!(error = %close, "failed to close session after setup failure");
                }
                Err(e)
            }
        }
    }

    async fn enter(&self, page: &mut Page, setup: &Setup) -> ProbeResult<()> {
        page.goto(&self.config.frontend_url).await?;
        let Some(credentials) = &setup.login else {
            return Ok(());
        };
        helpers::login(page, &credentials.username, &credentials.password).await?;
        if let Some(user) = setup
            .users
            .iter()
            .find(|u| u.username == credentials.username)
        {
            page.expect(Locator::text(logged_in_text(&user.name)))
                .to_be_visible()
                .await
                .map_err(|e| ProbeError::setup("login", e.to_string()))?;
        }
        debug!(state = %AuthState::observe(page).await?, "setup login done");
        Ok(())
    }
}

async fn run_steps<'s>(page: &mut Page, steps: &'s [Step]) -> Result<(), (&'s Step, ProbeError)> {
    for step in steps {
        debug!(step = %step.label(), "step");
        run_step(page, step).await.map_err(|e| (step, e))?;
    }
    Ok(())
}

/// Execute one step against a page
pub async fn run_step(page: &mut Page, step: &Step) -> ProbeResult<()> {
    match step {
        Step::Login { username, password } => helpers::login(page, username, password).await,
        Step::Logout => helpers::logout(page).await,
        Step::CreateBlog { title } => helpers::create_blog(page, title).await,
        Step::View { title } => helpers::view_blog(page, title).await,
        Step::Like { title, times } => {
            for _ in 0..*times {
                helpers::like_blog(page, title).await?;
            }
            Ok(())
        }
        Step::Remove { title } => helpers::remove_blog(page, title).await,
        Step::ExpectVisible(target) => {
            page.expect(target.locator()).to_be_visible().await?;
            Ok(())
        }
        Step::ExpectHidden(target) => {
            page.expect(target.locator()).not_to_be_visible().await?;
            Ok(())
        }
        Step::ExpectOrder { titles } => {
            page.expect(Locator::css(BLOG_ENTRY))
                .to_have_texts_containing(titles.as_slice())
                .await?;
            Ok(())
        }
        Step::ExpectLikesRanked => {
            page.expect(Locator::css(BLOG_ENTRY))
                .to_have_likes_non_increasing()
                .await?;
            Ok(())
        }
        Step::ExpectLoggedIn { name } => {
            page.expect(Locator::text(logged_in_text(name)))
                .to_be_visible()
                .await?;
            Ok(())
        }
        Step::ExpectLoggedOut => {
            page.expect(Locator::text(LOGIN_HEADING))
                .to_be_visible()
                .await?;
            match AuthState::observe(page).await? {
                AuthState::LoggedOut => Ok(()),
                state => Err(ProbeError::AssertionTimeout {
                    expected: "logged out".to_string(),
                    actual: state.to_string(),
                    timeout_ms: page.retry_config().timeout_ms(),
                }),
            }
        }
    }
}
