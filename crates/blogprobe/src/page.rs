//! Page: one authenticated-or-not browser session.
//!
//! Wraps a [`PageDriver`] with auto-waiting, strict action semantics and the
//! session's dialog handler.

use crate::assertion::{Expect, PollClock, RetryConfig};
use crate::dialog::{DialogAction, DialogExpectation, DialogHandler, DialogType};
use crate::driver::{ElementHandle, PageDriver};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};

/// A browser context under test
pub struct Page {
    driver: Box<dyn PageDriver>,
    retry: RetryConfig,
    dialogs: DialogHandler,
    closed: bool,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("retry", &self.retry)
            .field("dialogs", &self.dialogs)
            .field("closed", &self.closed)
            .finish()
    }
}

impl Page {
    /// Wrap a driver and route its dialogs through a fresh handler
    ///
    /// # Errors
    ///
    /// Returns error if the driver rejects the dialog handler
    pub async fn new(mut driver: Box<dyn PageDriver>, retry: RetryConfig) -> ProbeResult<Self> {
        let dialogs = DialogHandler::new();
        driver.install_dialog_handler(dialogs.clone()).await?;
        Ok(Self {
            driver,
            retry,
            dialogs,
            closed: false,
        })
    }

    /// Default retry timing for this page
    #[must_use]
    pub const fn retry_config(&self) -> RetryConfig {
        self.retry
    }

    pub(crate) fn config_for(&self, locator: &Locator) -> RetryConfig {
        locator.timeout().map_or(self.retry, |timeout| RetryConfig {
            timeout,
            poll_interval: self.retry.poll_interval,
        })
    }

    /// Navigate to URL
    pub async fn goto(&mut self, url: &str) -> ProbeResult<()> {
        tracing::debug!(url, "goto");
        self.driver.goto(url).await
    }

    /// Resolve a locator once, without waiting
    pub async fn resolve(&mut self, locator: &Locator) -> ProbeResult<Vec<ElementHandle>> {
        self.driver.query(locator).await
    }

    /// Text content of every match, in document order, without waiting
    pub async fn text_contents(&mut self, locator: &Locator) -> ProbeResult<Vec<String>> {
        Ok(self
            .resolve(locator)
            .await?
            .into_iter()
            .map(|el| el.text_content)
            .collect())
    }

    /// Whether any match is visible right now
    pub async fn is_visible(&mut self, locator: &Locator) -> ProbeResult<bool> {
        Ok(self.resolve(locator).await?.iter().any(|el| el.visible))
    }

    /// Wait until the locator resolves to exactly one visible element
    ///
    /// # Errors
    ///
    /// `StrictModeViolation` as soon as several visible elements match,
    /// `Timeout` if none becomes visible before the ceiling.
    pub async fn wait_for_actionable(&mut self, locator: &Locator) -> ProbeResult<ElementHandle> {
        let config = self.config_for(locator);
        let mut clock = PollClock::start(config);
        loop {
            let mut visible: Vec<ElementHandle> = self
                .resolve(locator)
                .await?
                .into_iter()
                .filter(|el| el.visible)
                .collect();
            match visible.len() {
                1 => return Ok(visible.remove(0)),
                0 => {}
                count => {
                    return Err(ProbeError::StrictModeViolation {
                        locator: locator.describe(),
                        count,
                    })
                }
            }
            if clock.expired() {
                return Err(ProbeError::Timeout {
                    locator: locator.describe(),
                    ms: config.timeout_ms(),
                });
            }
            clock.pause().await;
        }
    }

    /// Click the single visible element matching `locator`
    pub async fn click(&mut self, locator: &Locator) -> ProbeResult<()> {
        let element = self.wait_for_actionable(locator).await?;
        tracing::debug!(locator = %locator, "click");
        self.driver.click(&element).await
    }

    /// Fill the single visible input matching `locator`
    pub async fn fill(&mut self, locator: &Locator, text: &str) -> ProbeResult<()> {
        let element = self.wait_for_actionable(locator).await?;
        tracing::debug!(locator = %locator, "fill");
        self.driver.fill(&element, text).await
    }

    /// Start a bounded-wait assertion on `locator`
    pub fn expect(&mut self, locator: Locator) -> Expect<'_> {
        let config = self.config_for(&locator);
        Expect::new(self, locator, config)
    }

    /// Arm a one-shot dialog handler; call before the action that raises it
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if a handler is already armed
    pub fn on_dialog_once(
        &self,
        expected: DialogType,
        action: DialogAction,
    ) -> ProbeResult<DialogExpectation> {
        self.dialogs.arm(expected, action)
    }

    /// The session's dialog handler
    #[must_use]
    pub const fn dialogs(&self) -> &DialogHandler {
        &self.dialogs
    }

    /// Discard the browser context
    pub async fn close(mut self) -> ProbeResult<()> {
        self.closed = true;
        self.driver.close().await
    }
}
