//! Session factories: where fresh browser contexts come from.

use crate::assertion::RetryConfig;
use crate::page::Page;
use crate::result::ProbeResult;
use async_trait::async_trait;

/// Opens isolated browser contexts, one per scenario.
///
/// # Implementations
///
/// - `ChromiumSessionFactory` - real Chromium (`browser` feature)
/// - `MockSessionFactory` - in-process blog application (`mock` feature)
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Open a fresh context with no cookies or storage
    async fn open(&self, retry: RetryConfig) -> ProbeResult<Page>;

    /// Name used in logs
    fn name(&self) -> &'static str;
}
