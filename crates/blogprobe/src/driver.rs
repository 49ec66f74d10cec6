//! PageDriver - abstract browser-context trait
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  PageDriver (Abstract Trait)                                  │
//! ├───────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────┐        ┌─────────────────────────┐   │
//! │  │  ChromiumPage       │        │  MockBrowserContext     │   │
//! │  │  (feature=browser)  │        │  (feature=mock)         │   │
//! │  │  CDP via            │        │  in-process blog UI     │   │
//! │  │  chromiumoxide      │        │  over a shared store    │   │
//! │  └─────────────────────┘        └─────────────────────────┘   │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Drivers only resolve and act. Waiting, strictness and assertions live in
//! [`crate::Page`] so every driver gets the same semantics.

use crate::dialog::DialogHandler;
use crate::locator::Locator;
use crate::result::ProbeResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Element handle returned by a locator query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-scoped identifier, valid until the element leaves the page
    pub id: String,
    /// Element tag name
    pub tag_name: String,
    /// Text content including descendants
    pub text_content: String,
    /// Whether the element is rendered and visible
    pub visible: bool,
}

impl ElementHandle {
    /// Create a visible element handle with no text
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
            text_content: String::new(),
            visible: true,
        }
    }

    /// Set text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = text.into();
        self
    }

    /// Set visibility
    #[must_use]
    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}

/// One isolated browser context.
///
/// # Implementations
///
/// - `ChromiumPage` - CDP via chromiumoxide (`browser` feature)
/// - `MockBrowserContext` - in-process blog application (`mock` feature)
#[async_trait]
pub trait PageDriver: Send {
    /// Navigate to URL
    async fn goto(&mut self, url: &str) -> ProbeResult<()>;

    /// Resolve a locator to all matching elements, in document order
    async fn query(&mut self, locator: &Locator) -> ProbeResult<Vec<ElementHandle>>;

    /// Click an element
    async fn click(&mut self, element: &ElementHandle) -> ProbeResult<()>;

    /// Replace the value of an input element
    async fn fill(&mut self, element: &ElementHandle, text: &str) -> ProbeResult<()>;

    /// Route every dialog this context raises through `handler`
    async fn install_dialog_handler(&mut self, handler: DialogHandler) -> ProbeResult<()>;

    /// Discard the browser context
    async fn close(&mut self) -> ProbeResult<()>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_element_handle_builder() {
        let el = ElementHandle::new("7", "div")
            .with_text("first blog")
            .with_visible(false);
        assert_eq!(el.id, "7");
        assert_eq!(el.tag_name, "div");
        assert_eq!(el.text_content, "first blog");
        assert!(!el.visible);
    }

    #[test]
    fn test_element_handle_deserializes_resolver_shape() {
        let json = r#"{"id":"3","tag_name":"button","text_content":"view","visible":true}"#;
        let el: ElementHandle = serde_json::from_str(json).unwrap();
        assert_eq!(el, ElementHandle::new("3", "button").with_text("view"));
    }
}
