//! Multi-step UI procedures shared by scenarios.
//!
//! Helpers drive the page the way a user would and only fail when the page
//! cannot be driven. Whether a login was accepted is observed through the UI
//! by the caller, not returned from [`login`].

use crate::assertion::parse_likes;
use crate::dialog::{DialogAction, DialogType};
use crate::locator::{Locator, Role};
use crate::page::Page;
use crate::result::{ProbeError, ProbeResult};
use tracing::debug;

/// Blog form contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogDraft {
    /// Title, used to find the entry afterwards
    pub title: String,
    /// Author field
    pub author: String,
    /// URL field
    pub url: String,
}

impl BlogDraft {
    /// Draft with placeholder author and URL
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: "test author".to_string(),
            url: "http://example.com".to_string(),
        }
    }

    /// Set the author
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// Locator of the blog entry whose title text contains `title`
#[must_use]
pub fn blog_item(title: &str) -> Locator {
    Locator::text(title).parent()
}

/// Fill the login form and submit it
pub async fn login(page: &mut Page, username: &str, password: &str) -> ProbeResult<()> {
    debug!(username, "login");
    page.fill(&Locator::test_id("username"), username).await?;
    page.fill(&Locator::test_id("password"), password).await?;
    page.click(&Locator::role(Role::Button, "login")).await
}

/// Click logout
pub async fn logout(page: &mut Page) -> ProbeResult<()> {
    debug!("logout");
    page.click(&Locator::role(Role::Button, "logout")).await
}

/// Create a blog with placeholder author and URL
pub async fn create_blog(page: &mut Page, title: &str) -> ProbeResult<()> {
    create_blog_from(page, &BlogDraft::new(title)).await
}

/// Open the blog form, submit `draft`, and wait for the title to be listed
pub async fn create_blog_from(page: &mut Page, draft: &BlogDraft) -> ProbeResult<()> {
    debug!(title = %draft.title, "create blog");
    page.click(&Locator::role(Role::Button, "new blog")).await?;
    page.fill(&Locator::test_id("title"), &draft.title).await?;
    page.fill(&Locator::test_id("author"), &draft.author).await?;
    page.fill(&Locator::test_id("url"), &draft.url).await?;
    page.click(&Locator::role(Role::Button, "create")).await?;
    page.expect(Locator::text(&draft.title)).to_be_visible().await?;
    Ok(())
}

/// Expand the entry for `title` and wait for its details to render
pub async fn view_blog(page: &mut Page, title: &str) -> ProbeResult<()> {
    debug!(title, "view blog");
    let item = blog_item(title);
    page.click(&item.clone().get_by_role(Role::Button, "view"))
        .await?;
    page.wait_for_actionable(&item.get_by_role(Role::Button, "hide"))
        .await?;
    Ok(())
}

/// Like the expanded entry for `title` once and wait for the count to move
///
/// # Errors
///
/// `InvalidState` if the entry never shows a like button or count within
/// the ceiling, i.e. it was not expanded.
pub async fn like_blog(page: &mut Page, title: &str) -> ProbeResult<u64> {
    let item = blog_item(title);
    let like = item.clone().get_by_role(Role::Button, "like");
    let not_expanded = || ProbeError::InvalidState {
        message: format!("blog {title:?} shows no like count; view it first"),
    };
    match page.wait_for_actionable(&like).await {
        Ok(_) => {}
        Err(ProbeError::Timeout { .. }) => return Err(not_expanded()),
        Err(e) => return Err(e),
    }
    let entry = page.wait_for_actionable(&item).await?;
    let before = parse_likes(&entry.text_content).ok_or_else(not_expanded)?;
    page.click(&like).await?;
    let after = before + 1;
    page.expect(item).to_show_likes(after).await?;
    debug!(title, likes = after, "liked blog");
    Ok(after)
}

/// Remove the entry for `title`, accepting the confirmation dialog
pub async fn remove_blog(page: &mut Page, title: &str) -> ProbeResult<()> {
    debug!(title, "remove blog");
    let expectation = page.on_dialog_once(DialogType::Confirm, DialogAction::Accept)?;
    let remove = blog_item(title).get_by_role(Role::Button, "remove");
    if let Err(e) = page.click(&remove).await {
        expectation.cancel();
        return Err(e);
    }
    let config = page.retry_config();
    expectation.wait(config.timeout, config.poll_interval).await?;
    Ok(())
}
