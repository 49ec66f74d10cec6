//! Browser context over the mock application.
//!
//! Each context renders the blog UI from the shared store plus its own view
//! state: the logged-in user (what the real frontend keeps in local storage),
//! form inputs, notifications, the blog form toggle and which entries are
//! expanded. With a render latency set, changes only become visible once the
//! latency has elapsed, the way a real UI lags behind the click that caused
//! them.

use super::dom::{Click, Dom, Node};
use super::store::{BlogStore, SharedStore, StoreError, User};
use crate::auth::{logged_in_text, LOGIN_HEADING, WRONG_CREDENTIALS};
use crate::dialog::{Dialog, DialogHandler};
use crate::driver::{ElementHandle, PageDriver};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};
use tracing::debug;

/// How long a notification stays on screen
const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// Text shown after a blog is created
pub const BLOG_ADDED: &str = "a new blog added";

#[derive(Debug, Clone)]
struct Notification {
    message: String,
    error: bool,
    until: Instant,
}

#[derive(Debug, Default)]
struct ViewState {
    loaded: bool,
    inputs: HashMap<&'static str, String>,
    notification: Option<Notification>,
    form_open: bool,
    expanded: BTreeSet<u64>,
}

/// One isolated browser context on the mock application
pub struct MockBrowserContext {
    store: SharedStore,
    frontend_url: String,
    latency: Duration,
    session: Option<User>,
    view: ViewState,
    rendered: Dom,
    render_due: Option<Instant>,
    dialogs: Option<DialogHandler>,
    closed: bool,
}

impl std::fmt::Debug for MockBrowserContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBrowserContext")
            .field("frontend_url", &self.frontend_url)
            .field("latency", &self.latency)
            .field("session", &self.session.as_ref().map(|u| &u.username))
            .field("closed", &self.closed)
            .finish()
    }
}

impl MockBrowserContext {
    /// Fresh context with no login and no page loaded
    #[must_use]
    pub fn new(store: SharedStore, frontend_url: impl Into<String>) -> Self {
        Self {
            store,
            frontend_url: frontend_url.into(),
            latency: Duration::ZERO,
            session: None,
            view: ViewState::default(),
            rendered: Dom::new(),
            render_due: None,
            dialogs: None,
            closed: false,
        }
    }

    /// Delay between a change and its appearance on screen
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Username logged in to this context
    #[must_use]
    pub fn logged_in_user(&self) -> Option<&str> {
        self.session.as_ref().map(|u| u.username.as_str())
    }

    fn ensure_open(&self) -> ProbeResult<()> {
        if self.closed {
            return Err(ProbeError::InvalidState {
                message: "browser context is closed".to_string(),
            });
        }
        Ok(())
    }

    fn invalidate(&mut self) {
        self.render_due = Some(Instant::now() + self.latency);
    }

    /// Re-render unless a change is still in flight
    fn refresh(&mut self) -> ProbeResult<()> {
        if self.render_due.is_some_and(|due| Instant::now() < due) {
            return Ok(());
        }
        self.render_due = None;
        self.rendered = self.render()?;
        Ok(())
    }

    fn notify(&mut self, message: impl Into<String>, error: bool) {
        self.view.notification = Some(Notification {
            message: message.into(),
            error,
            until: Instant::now() + NOTIFICATION_TTL,
        });
    }

    fn input(&mut self, field: &'static str) -> String {
        self.view.inputs.remove(field).unwrap_or_default()
    }

    fn render(&self) -> ProbeResult<Dom> {
        let mut dom = Dom::new();
        if !self.view.loaded {
            return Ok(dom);
        }
        let root = dom.push(Some(Dom::root()), Node::new("root", "div"));
        if let Some(n) = &self.view.notification {
            if Instant::now() < n.until {
                let class = if n.error { "error" } else { "notification" };
                dom.push(
                    Some(root),
                    Node::new("notification", "div").class(class).text(&n.message),
                );
            }
        }
        match &self.session {
            None => self.render_login(&mut dom, root),
            Some(user) => self.render_blogs(&mut dom, root, user)?,
        }
        Ok(dom)
    }

    fn render_login(&self, dom: &mut Dom, root: usize) {
        dom.push(Some(root), Node::new("login-heading", "h2").text(LOGIN_HEADING));
        let form = dom.push(Some(root), Node::new("login-form", "form"));
        for field in ["username", "password"] {
            let row = dom.push(Some(form), Node::new(format!("login-{field}-row"), "div").text(field));
            dom.push(Some(row), Node::new(format!("login-{field}"), "input").input(field));
        }
        dom.push(
            Some(form),
            Node::new("login-submit", "button")
                .text("login")
                .on_click(Click::Login),
        );
    }

    fn render_blogs(&self, dom: &mut Dom, root: usize, user: &User) -> ProbeResult<()> {
        let (blogs, names) = {
            let store = BlogStore::lock(&self.store).map_err(store_error)?;
            let names: HashMap<String, String> = store
                .users()
                .iter()
                .map(|u| (u.username.clone(), u.name.clone()))
                .collect();
            (store.blogs_by_likes(), names)
        };

        dom.push(Some(root), Node::new("blogs-heading", "h2").text("blogs"));
        let session = dom.push(
            Some(root),
            Node::new("session", "p").text(logged_in_text(&user.name)),
        );
        dom.push(
            Some(session),
            Node::new("logout", "button")
                .text("logout")
                .on_click(Click::Logout),
        );

        let open = self.view.form_open;
        dom.push(
            Some(root),
            Node::new("form-open", "button")
                .text("new blog")
                .shown(!open)
                .on_click(Click::OpenForm),
        );
        let form = dom.push(Some(root), Node::new("blog-form", "div").shown(open));
        dom.push(Some(form), Node::new("blog-form-heading", "h2").text("create new"));
        for field in ["title", "author", "url"] {
            let row = dom.push(Some(form), Node::new(format!("blog-form-{field}-row"), "div").text(field));
            dom.push(Some(row), Node::new(format!("blog-form-{field}"), "input").input(field));
        }
        dom.push(
            Some(form),
            Node::new("blog-form-create", "button")
                .text("create")
                .on_click(Click::CreateBlog),
        );
        dom.push(
            Some(form),
            Node::new("blog-form-cancel", "button")
                .text("cancel")
                .on_click(Click::CloseForm),
        );

        for blog in blogs {
            let id = blog.id;
            let expanded = self.view.expanded.contains(&id);
            let entry = dom.push(Some(root), Node::new(format!("blog-{id}"), "div").class("blog"));
            dom.push(
                Some(entry),
                Node::new(format!("blog-{id}-title"), "span")
                    .text(format!("{} {}", blog.title, blog.author)),
            );
            dom.push(
                Some(entry),
                Node::new(format!("blog-{id}-toggle"), "button")
                    .text(if expanded { "hide" } else { "view" })
                    .on_click(Click::ToggleDetails(id)),
            );
            if !expanded {
                continue;
            }
            let details = dom.push(Some(entry), Node::new(format!("blog-{id}-details"), "div"));
            dom.push(
                Some(details),
                Node::new(format!("blog-{id}-url"), "div").text(&blog.url),
            );
            let likes = dom.push(
                Some(details),
                Node::new(format!("blog-{id}-likes"), "div").text(format!("likes {}", blog.likes)),
            );
            dom.push(
                Some(likes),
                Node::new(format!("blog-{id}-like"), "button")
                    .text("like")
                    .on_click(Click::Like(id)),
            );
            let owner = names.get(&blog.user).cloned().unwrap_or_default();
            dom.push(
                Some(details),
                Node::new(format!("blog-{id}-user"), "div").text(owner),
            );
            if blog.user == user.username {
                dom.push(
                    Some(details),
                    Node::new(format!("blog-{id}-remove"), "button")
                        .text("remove")
                        .on_click(Click::Remove(id)),
                );
            }
        }
        Ok(())
    }

    fn perform(&mut self, click: Click) -> ProbeResult<()> {
        match click {
            Click::Login => {
                let username = self.input("username");
                let password = self.input("password");
                let outcome = BlogStore::lock(&self.store)
                    .map_err(store_error)?
                    .authenticate(&username, &password);
                match outcome {
                    Ok(user) => {
                        debug!(username = %user.username, "mock login accepted");
                        self.session = Some(user);
                        self.view.notification = None;
                    }
                    Err(_) => {
                        debug!(%username, "mock login rejected");
                        self.notify(WRONG_CREDENTIALS, true);
                    }
                }
            }
            Click::Logout => {
                self.session = None;
                self.view = ViewState {
                    loaded: true,
                    ..ViewState::default()
                };
            }
            Click::OpenForm => self.view.form_open = true,
            Click::CloseForm => self.view.form_open = false,
            Click::CreateBlog => {
                let username = self.session_username()?;
                let title = self.input("title");
                let author = self.input("author");
                let url = self.input("url");
                let created = BlogStore::lock(&self.store)
                    .map_err(store_error)?
                    .create_blog(&username, &title, &author, &url);
                match created {
                    Ok(_) => {
                        self.view.form_open = false;
                        self.notify(BLOG_ADDED, false);
                    }
                    Err(e) => self.notify(e.to_string(), true),
                }
            }
            Click::ToggleDetails(id) => {
                if !self.view.expanded.remove(&id) {
                    self.view.expanded.insert(id);
                }
            }
            Click::Like(id) => {
                BlogStore::lock(&self.store)
                    .map_err(store_error)?
                    .like_blog(id)
                    .map_err(store_error)?;
            }
            Click::Remove(id) => self.confirm_remove(id)?,
        }
        self.invalidate();
        Ok(())
    }

    fn session_username(&self) -> ProbeResult<String> {
        self.session
            .as_ref()
            .map(|u| u.username.clone())
            .ok_or_else(|| ProbeError::InvalidState {
                message: "not logged in".to_string(),
            })
    }

    fn confirm_remove(&mut self, id: u64) -> ProbeResult<()> {
        let username = self.session_username()?;
        let message = {
            let store = BlogStore::lock(&self.store).map_err(store_error)?;
            store
                .blogs_by_likes()
                .into_iter()
                .find(|b| b.id == id)
                .map(|b| format!("Remove blog {} by {}", b.title, b.author))
                .ok_or_else(|| store_error(StoreError::BlogNotFound(id)))?
        };
        let dialog = Dialog::confirm(message);
        let dialog = match &self.dialogs {
            Some(handler) => handler.handle(dialog),
            None => dialog,
        };
        if !dialog.is_accepted() {
            debug!(id, "remove cancelled");
            return Ok(());
        }
        BlogStore::lock(&self.store)
            .map_err(store_error)?
            .remove_blog(id, &username)
            .map_err(store_error)?;
        self.view.expanded.remove(&id);
        Ok(())
    }
}

fn store_error(e: StoreError) -> ProbeError {
    ProbeError::page(format!("mock application: {e}"))
}

#[async_trait]
impl PageDriver for MockBrowserContext {
    async fn goto(&mut self, url: &str) -> ProbeResult<()> {
        self.ensure_open()?;
        if url.trim_end_matches('/') != self.frontend_url.trim_end_matches('/') {
            return Err(ProbeError::NavigationError {
                url: url.to_string(),
                message: format!("mock application serves {}", self.frontend_url),
            });
        }
        self.view = ViewState {
            loaded: true,
            ..ViewState::default()
        };
        self.invalidate();
        Ok(())
    }

    async fn query(&mut self, locator: &Locator) -> ProbeResult<Vec<ElementHandle>> {
        self.ensure_open()?;
        self.refresh()?;
        let dom = &self.rendered;
        Ok(dom
            .query(locator.steps())
            .into_iter()
            .map(|i| dom.handle(i))
            .collect())
    }

    async fn click(&mut self, element: &ElementHandle) -> ProbeResult<()> {
        self.ensure_open()?;
        let index = self
            .rendered
            .find_key(&element.id)
            .ok_or_else(|| ProbeError::page(format!("element {} is detached", element.id)))?;
        if !self.rendered.is_visible(index) {
            return Err(ProbeError::InputError {
                message: format!("element {} is not visible", element.id),
            });
        }
        match self.rendered.node(index).click {
            Some(click) => self.perform(click),
            None => Ok(()),
        }
    }

    async fn fill(&mut self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
        self.ensure_open()?;
        let index = self
            .rendered
            .find_key(&element.id)
            .ok_or_else(|| ProbeError::page(format!("element {} is detached", element.id)))?;
        let field = self
            .rendered
            .node(index)
            .field
            .ok_or_else(|| ProbeError::InputError {
                message: format!("element {} is not an input", element.id),
            })?;
        self.view.inputs.insert(field, text.to_string());
        Ok(())
    }

    async fn install_dialog_handler(&mut self, handler: DialogHandler) -> ProbeResult<()> {
        self.dialogs = Some(handler);
        Ok(())
    }

    async fn close(&mut self) -> ProbeResult<()> {
        self.closed = true;
        self.session = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_FRONTEND_URL;
    use crate::dialog::{DialogAction, DialogType};
    use crate::locator::Role;

    fn store_with_users() -> SharedStore {
        let store = BlogStore::shared();
        {
            let mut s = store.lock().unwrap();
            s.create_user(User::new("testuser", "test", "1234")).unwrap();
            s.create_user(User::new("otheruser", "other", "4321")).unwrap();
        }
        store
    }

    async fn visible(ctx: &mut MockBrowserContext, locator: &Locator) -> Vec<ElementHandle> {
        ctx.query(locator)
            .await
            .unwrap()
            .into_iter()
            .filter(|e| e.visible)
            .collect()
    }

    async fn click(ctx: &mut MockBrowserContext, locator: Locator) {
        let found = visible(ctx, &locator).await;
        assert_eq!(found.len(), 1, "{locator} matched {found:?}");
        ctx.click(&found[0]).await.unwrap();
    }

    async fn fill(ctx: &mut MockBrowserContext, test_id: &str, text: &str) {
        let found = visible(ctx, &Locator::test_id(test_id)).await;
        assert_eq!(found.len(), 1);
        ctx.fill(&found[0], text).await.unwrap();
    }

    async fn login(ctx: &mut MockBrowserContext, username: &str, password: &str) {
        fill(ctx, "username", username).await;
        fill(ctx, "password", password).await;
        click(ctx, Locator::role(Role::Button, "login")).await;
    }

    async fn open(store: &SharedStore) -> MockBrowserContext {
        let mut ctx = MockBrowserContext::new(store.clone(), DEFAULT_FRONTEND_URL);
        ctx.goto(DEFAULT_FRONTEND_URL).await.unwrap();
        ctx
    }

    #[tokio::test]
    async fn test_blank_until_navigation() {
        let store = store_with_users();
        let mut ctx = MockBrowserContext::new(store, DEFAULT_FRONTEND_URL);
        assert!(ctx.query(&Locator::text(LOGIN_HEADING)).await.unwrap().is_empty());
        let err = ctx.goto("http://elsewhere.test").await.unwrap_err();
        assert!(matches!(err, ProbeError::NavigationError { .. }));
        ctx.goto(DEFAULT_FRONTEND_URL).await.unwrap();
        assert_eq!(visible(&mut ctx, &Locator::text(LOGIN_HEADING)).await.len(), 1);
    }

    #[tokio::test]
    async fn test_login_success_and_failure() {
        let store = store_with_users();
        let mut ctx = open(&store).await;
        login(&mut ctx, "testuser", "wrong").await;
        assert_eq!(visible(&mut ctx, &Locator::text(WRONG_CREDENTIALS)).await.len(), 1);
        assert!(visible(&mut ctx, &Locator::text("logged in")).await.is_empty());

        login(&mut ctx, "testuser", "1234").await;
        assert_eq!(visible(&mut ctx, &Locator::text("test logged in")).await.len(), 1);
        assert!(visible(&mut ctx, &Locator::text(WRONG_CREDENTIALS)).await.is_empty());
        assert_eq!(ctx.logged_in_user(), Some("testuser"));
    }

    #[tokio::test]
    async fn test_blog_form_hidden_until_opened() {
        let store = store_with_users();
        let mut ctx = open(&store).await;
        login(&mut ctx, "testuser", "1234").await;
        assert!(visible(&mut ctx, &Locator::test_id("title")).await.is_empty());
        click(&mut ctx, Locator::role(Role::Button, "new blog")).await;
        fill(&mut ctx, "title", "first blog").await;
        fill(&mut ctx, "author", "Ann").await;
        fill(&mut ctx, "url", "http://a.test").await;
        click(&mut ctx, Locator::role(Role::Button, "create")).await;

        assert!(visible(&mut ctx, &Locator::test_id("title")).await.is_empty());
        let entries = visible(&mut ctx, &Locator::css(".blog")).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text_content, "first blog Ann view");
        assert_eq!(visible(&mut ctx, &Locator::text(BLOG_ADDED)).await.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_needs_accepted_confirm() {
        let store = store_with_users();
        let id = store
            .lock()
            .unwrap()
            .create_blog("testuser", "delete this blog", "a", "u")
            .unwrap()
            .id;
        let mut ctx = open(&store).await;
        let handler = DialogHandler::new();
        ctx.install_dialog_handler(handler.clone()).await.unwrap();
        login(&mut ctx, "testuser", "1234").await;
        let item = Locator::text("delete this blog").parent();
        click(&mut ctx, item.clone().get_by_role(Role::Button, "view")).await;

        // Nothing armed: dismissed, blog survives
        click(&mut ctx, item.clone().get_by_role(Role::Button, "remove")).await;
        assert_eq!(handler.unexpected().len(), 1);
        assert_eq!(store.lock().unwrap().blogs_by_likes().len(), 1);

        let expectation = handler
            .arm(DialogType::Confirm, DialogAction::Accept)
            .unwrap();
        click(&mut ctx, item.get_by_role(Role::Button, "remove")).await;
        assert!(expectation.dialog().unwrap().message().contains("delete this blog"));
        assert!(store.lock().unwrap().blogs_by_likes().iter().all(|b| b.id != id));
        assert!(visible(&mut ctx, &Locator::text("delete this blog")).await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_button_only_for_creator() {
        let store = store_with_users();
        store
            .lock()
            .unwrap()
            .create_blog("testuser", "blog by testuser", "a", "u")
            .unwrap();
        let mut ctx = open(&store).await;
        login(&mut ctx, "otheruser", "4321").await;
        let item = Locator::text("blog by testuser").parent();
        click(&mut ctx, item.clone().get_by_role(Role::Button, "view")).await;
        assert_eq!(visible(&mut ctx, &Locator::text("likes 0")).await.len(), 1);
        assert!(visible(&mut ctx, &item.get_by_role(Role::Button, "remove")).await.is_empty());
    }

    #[tokio::test]
    async fn test_contexts_keep_separate_logins() {
        let store = store_with_users();
        let mut first = open(&store).await;
        let mut second = open(&store).await;
        login(&mut first, "testuser", "1234").await;
        assert_eq!(first.logged_in_user(), Some("testuser"));
        assert_eq!(second.logged_in_user(), None);
        assert_eq!(visible(&mut second, &Locator::text(LOGIN_HEADING)).await.len(), 1);
    }

    #[tokio::test]
    async fn test_latency_delays_rendering() {
        let store = store_with_users();
        let mut ctx = MockBrowserContext::new(store, DEFAULT_FRONTEND_URL)
            .with_latency(Duration::from_millis(50));
        ctx.goto(DEFAULT_FRONTEND_URL).await.unwrap();
        assert!(visible(&mut ctx, &Locator::text(LOGIN_HEADING)).await.is_empty());
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(visible(&mut ctx, &Locator::text(LOGIN_HEADING)).await.len(), 1);
    }

    #[tokio::test]
    async fn test_closed_context_rejects_actions() {
        let store = store_with_users();
        let mut ctx = open(&store).await;
        ctx.close().await.unwrap();
        assert!(matches!(
            ctx.query(&Locator::text(LOGIN_HEADING)).await,
            Err(ProbeError::InvalidState { .. })
        ));
    }
}
