//! Bounded-wait assertions on a locator.
//!
//! ```ignore
//! page.expect(Locator::text("test1 logged in")).to_be_visible().await?;
//! page.expect(Locator::text("Wrong credentials")).not_to_be_visible().await?;
//! page.expect(Locator::css(".blog"))
//!     .to_have_texts_containing(&["second blog", "first blog", "third blog"])
//!     .await?;
//! ```

use super::retry::{AssertionCheckResult, PollClock, RetryConfig, RetryResult};
use super::Assertion;
use crate::driver::ElementHandle;
use crate::locator::Locator;
use crate::page::Page;
use crate::result::{ProbeError, ProbeResult};
use std::time::Duration;

/// Pending assertion on a locator
#[derive(Debug)]
pub struct Expect<'a> {
    page: &'a mut Page,
    locator: Locator,
    config: RetryConfig,
}

impl<'a> Expect<'a> {
    pub(crate) fn new(page: &'a mut Page, locator: Locator, config: RetryConfig) -> Self {
        Self {
            page,
            locator,
            config,
        }
    }

    /// Override the ceiling for this assertion
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// At least one match is visible
    pub async fn to_be_visible(self) -> ProbeResult<RetryResult> {
        let expected = format!("{} to be visible", self.locator);
        self.poll(expected, |elements| {
            if elements.iter().any(|el| el.visible) {
                AssertionCheckResult::Pass
            } else {
                AssertionCheckResult::Fail(describe(elements))
            }
        })
        .await
    }

    /// No match is visible (absent or hidden)
    pub async fn not_to_be_visible(self) -> ProbeResult<RetryResult> {
        let expected = format!("{} not to be visible", self.locator);
        self.poll(expected, |elements| {
            if elements.iter().any(|el| el.visible) {
                AssertionCheckResult::Fail(describe(elements))
            } else {
                AssertionCheckResult::Pass
            }
        })
        .await
    }

    /// Exactly `count` elements match
    pub async fn to_have_count(self, count: usize) -> ProbeResult<RetryResult> {
        let expected = format!("{} to match {count} element(s)", self.locator);
        self.poll(expected, move |elements| {
            if elements.len() == count {
                AssertionCheckResult::Pass
            } else {
                AssertionCheckResult::Fail(describe(elements))
            }
        })
        .await
    }

    /// Match `i` contains `expected[i]`, for every expected position
    pub async fn to_have_texts_containing<S: AsRef<str> + Sync>(
        self,
        expected: &[S],
    ) -> ProbeResult<RetryResult> {
        let wanted: Vec<&str> = expected.iter().map(AsRef::as_ref).collect();
        let description = format!("{} to contain {:?} in order", self.locator, wanted);
        self.poll(description, |elements| {
            let texts: Vec<String> = elements.iter().map(|el| el.text_content.clone()).collect();
            Assertion::contains_in_order(&texts, &wanted).into()
        })
        .await
    }

    /// Some match shows exactly `likes {likes}`
    pub async fn to_show_likes(self, likes: u64) -> ProbeResult<RetryResult> {
        let expected = format!("{} to show likes {likes}", self.locator);
        self.poll(expected, move |elements| {
            let seen: Vec<Option<u64>> = elements
                .iter()
                .map(|el| super::parse_likes(&el.text_content))
                .collect();
            if seen.contains(&Some(likes)) {
                AssertionCheckResult::Pass
            } else {
                AssertionCheckResult::Fail(format!("like counts {seen:?}"))
            }
        })
        .await
    }

    /// Every match shows `likes N` and counts never increase down the list
    pub async fn to_have_likes_non_increasing(self) -> ProbeResult<RetryResult> {
        let expected = format!("{} to be ranked by likes", self.locator);
        self.poll(expected, |elements| {
            let texts: Vec<String> = elements.iter().map(|el| el.text_content.clone()).collect();
            Assertion::likes_ranked(&texts).into()
        })
        .await
    }

    async fn poll<F>(self, expected: String, check: F) -> ProbeResult<RetryResult>
    where
        F: Fn(&[ElementHandle]) -> AssertionCheckResult,
    {
        let mut clock = PollClock::start(self.config);
        loop {
            let elements = self.page.resolve(&self.locator).await?;
            match check(&elements) {
                AssertionCheckResult::Pass => {
                    let result = clock.finish();
                    tracing::debug!(%expected, attempts = result.attempts, "assertion passed");
                    return Ok(result);
                }
                AssertionCheckResult::Fail(actual) => {
                    if clock.expired() {
                        return Err(ProbeError::AssertionTimeout {
                            expected,
                            actual,
                            timeout_ms: self.config.timeout_ms(),
                        });
                    }
                }
            }
            clock.pause().await;
        }
    }
}

fn describe(elements: &[ElementHandle]) -> String {
    if elements.is_empty() {
        return "no matching element".to_string();
    }
    let visible = elements.iter().filter(|el| el.visible).count();
    format!("{} match(es), {visible} visible", elements.len())
}
