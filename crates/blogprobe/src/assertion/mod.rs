//! Assertions for scenario verdicts.
//!
//! Pure checks over rendered text live here; the polling [`Expect`] API in
//! [`expect`] feeds them snapshots of the page until they pass or time out.

pub mod expect;
pub mod retry;

pub use expect::Expect;
pub use retry::{AssertionCheckResult, PollClock, RetryConfig, RetryResult};

use regex::Regex;
use std::sync::LazyLock;

static LIKES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\blikes\s+(\d+)").expect("static regex"));

/// Result of an assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }
}

impl From<AssertionResult> for AssertionCheckResult {
    fn from(result: AssertionResult) -> Self {
        if result.passed {
            Self::Pass
        } else {
            Self::Fail(result.message)
        }
    }
}

/// Extract the like count from a rendered blog entry (`"likes 3"`)
#[must_use]
pub fn parse_likes(text: &str) -> Option<u64> {
    LIKES_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Assertion helpers over rendered state
#[derive(Debug)]
pub struct Assertion;

impl Assertion {
    /// Assert item `i` of `actual` contains `expected[i]` for every `i`.
    ///
    /// Extra rendered items after the expected prefix are ignored.
    #[must_use]
    pub fn contains_in_order<S: AsRef<str>>(actual: &[String], expected: &[S]) -> AssertionResult {
        if actual.len() < expected.len() {
            return AssertionResult::fail(format!(
                "expected at least {} items, got {}: {actual:?}",
                expected.len(),
                actual.len()
            ));
        }
        for (index, (item, want)) in actual.iter().zip(expected).enumerate() {
            if !crate::locator::text_matches(item, want.as_ref()) {
                return AssertionResult::fail(format!(
                    "item {index} is {item:?}, expected it to contain {:?}",
                    want.as_ref()
                ));
            }
        }
        AssertionResult::pass()
    }

    /// Assert a sequence never increases; ties are allowed in any order
    #[must_use]
    pub fn non_increasing(values: &[u64]) -> AssertionResult {
        match values.windows(2).position(|w| w[0] < w[1]) {
            None => AssertionResult::pass(),
            Some(i) => AssertionResult::fail(format!(
                "position {} has {} but position {} has {}: {values:?}",
                i,
                values[i],
                i + 1,
                values[i + 1]
            )),
        }
    }

    /// Assert every rendered item shows a like count and counts never increase
    #[must_use]
    pub fn likes_ranked(items: &[String]) -> AssertionResult {
        let mut likes = Vec::with_capacity(items.len());
        for item in items {
            match parse_likes(item) {
                Some(n) => likes.push(n),
                None => {
                    return AssertionResult::fail(format!("no like count rendered in {item:?}"))
                }
            }
        }
        Self::non_increasing(&likes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_likes() {
        assert_eq!(parse_likes("second blog test hide likes 2 like"), Some(2));
        assert_eq!(parse_likes("Likes 10"), Some(10));
        assert_eq!(parse_likes("third blog view"), None);
    }

    #[test]
    fn test_contains_in_order_passes() {
        let rendered = strings(&["second blog a view", "first blog a view", "third blog a view"]);
        let result = Assertion::contains_in_order(&rendered, &["second blog", "first blog", "third blog"]);
        assert!(result.passed, "{}", result.message);
    }

    #[test]
    fn test_contains_in_order_reports_position() {
        let rendered = strings(&["first blog", "second blog"]);
        let result = Assertion::contains_in_order(&rendered, &["second blog", "first blog"]);
        assert!(!result.passed);
        assert!(result.message.contains("item 0"));
    }

    #[test]
    fn test_contains_in_order_too_short() {
        let rendered = strings(&["first blog"]);
        let result = Assertion::contains_in_order(&rendered, &["first blog", "second blog"]);
        assert!(!result.passed);
        assert!(result.message.contains("at least 2"));
    }

    #[test]
    fn test_non_increasing_allows_ties() {
        assert!(Assertion::non_increasing(&[3, 2, 2, 0]).passed);
        assert!(Assertion::non_increasing(&[]).passed);
        assert!(!Assertion::non_increasing(&[1, 2]).passed);
    }

    #[test]
    fn test_likes_ranked_requires_counts() {
        let collapsed = strings(&["likes 2", "first blog view"]);
        assert!(!Assertion::likes_ranked(&collapsed).passed);
        let expanded = strings(&["likes 2", "likes 1", "likes 0"]);
        assert!(Assertion::likes_ranked(&expanded).passed);
    }

    #[test]
    fn test_into_check_result() {
        let check: AssertionCheckResult = AssertionResult::fail("nope").into();
        assert_eq!(check, AssertionCheckResult::Fail("nope".to_string()));
    }

    proptest! {
        #[test]
        fn prop_sorted_desc_is_non_increasing(mut values in proptest::collection::vec(0u64..1000, 0..32)) {
            values.sort_unstable_by(|a, b| b.cmp(a));
            prop_assert!(Assertion::non_increasing(&values).passed);
        }

        #[test]
        fn prop_any_ascent_is_caught(values in proptest::collection::vec(0u64..1000, 2..32)) {
            let has_ascent = values.windows(2).any(|w| w[0] < w[1]);
            prop_assert_eq!(Assertion::non_increasing(&values).passed, !has_ascent);
        }

        #[test]
        fn prop_parse_likes_roundtrips_rendering(n in 0u64..100_000) {
            let rendered = format!("some title author hide http://x likes {n} like");
            prop_assert_eq!(parse_likes(&rendered), Some(n));
        }
    }
}
