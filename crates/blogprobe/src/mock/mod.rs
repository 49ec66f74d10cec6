//! In-process blog application for exercising the harness.
//!
//! ```text
//!   SeedClient ──HTTP──▶ MockBackend (axum) ─┐
//!                                            ├─▶ SharedStore
//!   Page ──PageDriver──▶ MockBrowserContext ─┘
//! ```
//!
//! The backend and every browser context share one [`SharedStore`], so users
//! seeded over HTTP can log in through the rendered UI.

pub mod backend;
mod context;
mod dom;
pub mod store;

pub use backend::MockBackend;
pub use context::{MockBrowserContext, BLOG_ADDED};
pub use store::{Blog, BlogStore, SharedStore, StoreError, User};

use crate::assertion::RetryConfig;
use crate::config::{HarnessConfig, DEFAULT_FRONTEND_URL};
use crate::page::Page;
use crate::result::ProbeResult;
use crate::session::SessionFactory;
use async_trait::async_trait;
use std::time::Duration;

/// Mock backend plus a factory for browser contexts on the same store
#[derive(Debug)]
pub struct MockBlogApp {
    store: SharedStore,
    backend: MockBackend,
    frontend_url: String,
    latency: Duration,
}

impl MockBlogApp {
    /// Start the backend on an ephemeral port
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot bind
    pub async fn start() -> ProbeResult<Self> {
        let store = BlogStore::shared();
        let backend = MockBackend::spawn(store.clone()).await?;
        Ok(Self {
            store,
            backend,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            latency: Duration::ZERO,
        })
    }

    /// Render latency for contexts opened from now on
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// URL the contexts accept in `goto`
    #[must_use]
    pub fn with_frontend_url(mut self, url: impl Into<String>) -> Self {
        self.frontend_url = url.into();
        self
    }

    /// Backend base URL
    #[must_use]
    pub fn backend_url(&self) -> String {
        self.backend.url()
    }

    /// Frontend URL
    #[must_use]
    pub fn frontend_url(&self) -> &str {
        &self.frontend_url
    }

    /// Shared store
    #[must_use]
    pub fn store(&self) -> SharedStore {
        self.store.clone()
    }

    /// Harness configuration pointing at this app
    #[must_use]
    pub fn config(&self) -> HarnessConfig {
        HarnessConfig::default()
            .with_frontend_url(self.frontend_url.clone())
            .with_backend_url(self.backend_url())
    }

    /// A single context, outside of any runner
    #[must_use]
    pub fn context(&self) -> MockBrowserContext {
        MockBrowserContext::new(self.store.clone(), self.frontend_url.clone())
            .with_latency(self.latency)
    }

    /// Session factory producing contexts on this app
    #[must_use]
    pub fn session_factory(&self) -> MockSessionFactory {
        MockSessionFactory {
            store: self.store.clone(),
            frontend_url: self.frontend_url.clone(),
            latency: self.latency,
        }
    }
}

/// Opens [`MockBrowserContext`]s on a shared store
#[derive(Debug, Clone)]
pub struct MockSessionFactory {
    store: SharedStore,
    frontend_url: String,
    latency: Duration,
}

#[async_trait]
impl SessionFactory for MockSessionFactory {
    async fn open(&self, retry: RetryConfig) -> ProbeResult<Page> {
        let context = MockBrowserContext::new(self.store.clone(), self.frontend_url.clone())
            .with_latency(self.latency);
        Page::new(Box::new(context), retry).await
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
