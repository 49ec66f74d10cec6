//! Locator abstraction for element selection.
//!
//! A [`Locator`] is an ordered chain of [`Selector`]s resolved lazily every
//! time it is used, so a locator built before a re-render still finds the
//! element in its new position.
//!
//! # Design
//!
//! - **Auto-Waiting**: actions through [`crate::Page`] wait for the locator to
//!   become actionable
//! - **Strict Selection**: actions fail if several visible elements match
//! - **Fluent API**: chain `text("liked blog").parent().get_by_role(...)`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default ceiling for auto-waiting and assertions (10 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval for auto-waiting (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Accessible role of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// `<button>` or `input[type=button|submit]`
    Button,
    /// Text inputs and textareas
    Textbox,
    /// `<h1>`..`<h6>`
    Heading,
    /// Anchor with `href`
    Link,
    /// `<li>`
    Listitem,
}

impl Role {
    /// ARIA role name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Textbox => "textbox",
            Self::Heading => "heading",
            Self::Link => "link",
            Self::Listitem => "listitem",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selector type for one step of a locator chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Element whose own text contains this fragment
    Text(String),
    /// Element with accessible role and name
    Role {
        /// Accessible role
        role: Role,
        /// Accessible name (case-insensitive exact match)
        name: String,
    },
    /// Test ID selector (`data-testid` attribute)
    TestId(String),
    /// Simple CSS selector (`.class` or `tag`)
    Css(String),
    /// Structural parent (`..`)
    Parent,
}

impl Selector {
    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a role selector
    #[must_use]
    pub fn role(role: Role, name: impl Into<String>) -> Self {
        Self::Role {
            role,
            name: name.into(),
        }
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Human-readable form used in error messages
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Text(t) => format!("text={t:?}"),
            Self::Role { role, name } => format!("role={role}[name={name:?}]"),
            Self::TestId(id) => format!("testid={id:?}"),
            Self::Css(s) => format!("css={s}"),
            Self::Parent => "..".to_string(),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Text(t) => serde_json::json!({ "kind": "text", "value": t }),
            Self::Role { role, name } => {
                serde_json::json!({ "kind": "role", "role": role.as_str(), "name": name })
            }
            Self::TestId(id) => serde_json::json!({ "kind": "testid", "value": id }),
            Self::Css(s) => serde_json::json!({ "kind": "css", "value": s }),
            Self::Parent => serde_json::json!({ "kind": "parent" }),
        }
    }
}

/// Collapse whitespace and lowercase, the way text matching compares strings
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Case-insensitive, whitespace-normalised substring match
#[must_use]
pub fn text_matches(haystack: &str, needle: &str) -> bool {
    normalize_text(haystack).contains(&normalize_text(needle))
}

/// Case-insensitive exact match of an accessible name
#[must_use]
pub fn name_matches(accessible_name: &str, expected: &str) -> bool {
    normalize_text(accessible_name) == normalize_text(expected)
}

/// A lazily resolved chain of selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    steps: Vec<Selector>,
    timeout: Option<Duration>,
}

impl Locator {
    /// Create a locator from a single selector
    #[must_use]
    pub fn from_selector(selector: Selector) -> Self {
        Self {
            steps: vec![selector],
            timeout: None,
        }
    }

    /// Page-level text locator
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::text(text))
    }

    /// Page-level role locator
    #[must_use]
    pub fn role(role: Role, name: impl Into<String>) -> Self {
        Self::from_selector(Selector::role(role, name))
    }

    /// Page-level test ID locator
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::from_selector(Selector::test_id(id))
    }

    /// Page-level CSS locator
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::css(selector))
    }

    fn then(mut self, selector: Selector) -> Self {
        self.steps.push(selector);
        self
    }

    /// Narrow to descendants containing text
    #[must_use]
    pub fn get_by_text(self, text: impl Into<String>) -> Self {
        self.then(Selector::text(text))
    }

    /// Narrow to descendants with role and name
    #[must_use]
    pub fn get_by_role(self, role: Role, name: impl Into<String>) -> Self {
        self.then(Selector::role(role, name))
    }

    /// Narrow to descendants with a test ID
    #[must_use]
    pub fn get_by_test_id(self, id: impl Into<String>) -> Self {
        self.then(Selector::test_id(id))
    }

    /// Narrow to descendants matching a CSS selector
    #[must_use]
    pub fn locator(self, selector: impl Into<String>) -> Self {
        self.then(Selector::css(selector))
    }

    /// Move to the parent element of every match
    #[must_use]
    pub fn parent(self) -> Self {
        self.then(Selector::Parent)
    }

    /// Set a custom timeout for waits on this locator
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Timeout override, if any
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Selector chain
    #[must_use]
    pub fn steps(&self) -> &[Selector] {
        &self.steps
    }

    /// Human-readable form used in error messages
    #[must_use]
    pub fn describe(&self) -> String {
        self.steps
            .iter()
            .map(Selector::describe)
            .collect::<Vec<_>>()
            .join(" >> ")
    }

    /// JavaScript expression resolving this locator in a live page.
    ///
    /// Evaluates to an array of `{ id, tag, text, visible }` objects in
    /// document order. Every matched element is tagged with a
    /// `data-blogprobe-id` attribute so later actions can address it.
    #[must_use]
    pub fn to_query(&self) -> String {
        let steps: Vec<serde_json::Value> = self.steps.iter().map(Selector::to_json).collect();
        let steps = serde_json::Value::Array(steps).to_string();
        format!("({RESOLVER_JS})({steps})")
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

const RESOLVER_JS: &str = r#"function (steps) {
  const norm = (s) => (s || '').replace(/\s+/g, ' ').trim().toLowerCase();
  const ownText = (el) => Array.from(el.childNodes)
    .filter((n) => n.nodeType === Node.TEXT_NODE)
    .map((n) => n.textContent)
    .join(' ');
  const roleOf = (el) => {
    const explicit = el.getAttribute('role');
    if (explicit) return explicit;
    const tag = el.tagName.toLowerCase();
    if (tag === 'button') return 'button';
    if (tag === 'input') {
      const t = (el.getAttribute('type') || 'text').toLowerCase();
      return ['button', 'submit', 'reset'].includes(t) ? 'button' : 'textbox';
    }
    if (tag === 'textarea') return 'textbox';
    if (/^h[1-6]$/.test(tag)) return 'heading';
    if (tag === 'a' && el.hasAttribute('href')) return 'link';
    if (tag === 'li') return 'listitem';
    return null;
  };
  const nameOf = (el) => norm(el.getAttribute('aria-label')
    || (el.tagName === 'INPUT' ? el.value : el.textContent));
  const matches = (el, step) => {
    switch (step.kind) {
      case 'text': return norm(ownText(el)).includes(norm(step.value));
      case 'role': return roleOf(el) === step.role && nameOf(el) === norm(step.name);
      case 'testid': return el.getAttribute('data-testid') === step.value;
      case 'css': return el.matches(step.value);
      default: return false;
    }
  };
  let current = [document.documentElement];
  for (const step of steps) {
    const next = [];
    const seen = new Set();
    const push = (el) => { if (el && !seen.has(el)) { seen.add(el); next.push(el); } };
    for (const root of current) {
      if (step.kind === 'parent') { push(root.parentElement); continue; }
      for (const el of [root, ...root.querySelectorAll('*')]) {
        if (matches(el, step)) push(el);
      }
    }
    next.sort((a, b) => (a.compareDocumentPosition(b) & Node.DOCUMENT_POSITION_FOLLOWING) ? -1 : 1);
    current = next;
  }
  return current.map((el) => {
    if (!el.dataset.blogprobeId) {
      window.__blogprobeSeq = (window.__blogprobeSeq || 0) + 1;
      el.dataset.blogprobeId = String(window.__blogprobeSeq);
    }
    const rect = el.getBoundingClientRect();
    const style = window.getComputedStyle(el);
    return {
      id: el.dataset.blogprobeId,
      tag: el.tagName.toLowerCase(),
      text: el.textContent || '',
      visible: rect.width > 0 && rect.height > 0 && style.visibility !== 'hidden',
    };
  });
}"#;
