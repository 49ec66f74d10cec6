//! blogprobe: browser-driven acceptance tests for a two-tier blog application
//!
//! Scenarios drive the blog frontend through a [`PageDriver`] and prepare
//! state by calling the backend's testing API directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    BLOGPROBE Architecture                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────────────┐    │
//! │   │ Suite /    │    │ Scenario   │    │ Page (auto-wait,   │    │
//! │   │ YAML steps │───►│ Runner     │───►│ strict, dialogs)   │    │
//! │   └────────────┘    └─────┬──────┘    └─────────┬──────────┘    │
//! │                           │ reset/seed          │ PageDriver     │
//! │                           ▼                     ▼                │
//! │                    ┌────────────┐    ┌────────────────────┐     │
//! │                    │ Backend    │    │ Chromium (CDP) or  │     │
//! │                    │ test API   │    │ mock application   │     │
//! │                    └────────────┘    └────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use blogprobe::prelude::*;
//!
//! let app = MockBlogApp::start().await?;
//! let runner = ScenarioRunner::new(app.config(), Box::new(app.session_factory()))?;
//! let report = runner.run(&blog_app_suite()).await;
//! assert!(report.all_passed());
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod assertion;
pub mod auth;
#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc, clippy::doc_markdown)]
mod browser;
pub mod config;
pub mod dialog;
mod driver;
#[allow(clippy::missing_errors_doc)]
pub mod helpers;
mod locator;
/// In-process blog application: store, HTTP backend and rendered UI
#[cfg(feature = "mock")]
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::doc_markdown
)]
pub mod mock;
#[allow(clippy::missing_errors_doc)]
mod page;
pub mod report;
mod result;
#[allow(clippy::missing_errors_doc)]
pub mod runner;
pub mod scenario;
#[allow(clippy::missing_errors_doc)]
pub mod seed;
mod session;
pub mod suite;

pub use assertion::{
    parse_likes, Assertion, AssertionCheckResult, AssertionResult, Expect, RetryConfig,
    RetryResult,
};
pub use auth::{AuthEvent, AuthState};
#[cfg(feature = "browser")]
pub use browser::{ChromiumOptions, ChromiumPage, ChromiumSessionFactory};
pub use config::HarnessConfig;
pub use dialog::{
    AutoDialogBehavior, Dialog, DialogAction, DialogExpectation, DialogHandler, DialogType,
};
pub use driver::{ElementHandle, PageDriver};
pub use locator::{
    Locator, Role, Selector, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS,
};
pub use page::Page;
pub use report::{Failure, FailureKind, ScenarioResult, SuiteReport};
pub use result::{ProbeError, ProbeResult};
pub use runner::ScenarioRunner;
pub use scenario::{Credentials, Scenario, ScenarioGroup, Setup, Step, Suite, Target};
pub use seed::{NewUser, SeedClient};
pub use session::SessionFactory;
pub use suite::blog_app_suite;

/// Everything a scenario author usually needs
pub mod prelude {
    pub use super::helpers::{
        blog_item, create_blog, like_blog, login, logout, remove_blog, view_blog, BlogDraft,
    };
    #[cfg(feature = "mock")]
    pub use super::mock::{MockBlogApp, MockSessionFactory};
    pub use super::{
        blog_app_suite, AuthState, DialogAction, DialogType, HarnessConfig, Locator, Page,
        ProbeError, ProbeResult, Role, Scenario, ScenarioGroup, ScenarioRunner, Setup, Step,
        Suite, SuiteReport, Target,
    };
}
