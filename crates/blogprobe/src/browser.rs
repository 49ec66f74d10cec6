//! Chromium over CDP.
//!
//! One browser process serves the whole run; every session gets its own
//! browser context, so cookies and local storage never leak between
//! scenarios.

use crate::assertion::RetryConfig;
use crate::dialog::{Dialog, DialogHandler, DialogType};
use crate::driver::{ElementHandle, PageDriver};
use crate::locator::Locator;
use crate::page::Page;
use crate::result::{ProbeError, ProbeResult};
use crate::session::SessionFactory;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::page::{
    DialogType as CdpDialogType, EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Launch options
#[derive(Debug, Clone, Default)]
pub struct ChromiumOptions {
    /// Run without a window
    pub headless: bool,
    /// Chromium executable, found on PATH when unset
    pub executable: Option<String>,
    /// Disable the sandbox (containers)
    pub no_sandbox: bool,
}

/// Launches Chromium once and opens an isolated context per session
#[derive(Debug)]
pub struct ChromiumSessionFactory {
    browser: Arc<Mutex<CdpBrowser>>,
    handler: JoinHandle<()>,
}

impl ChromiumSessionFactory {
    /// Launch Chromium
    ///
    /// # Errors
    ///
    /// Returns `BrowserLaunchError` if the browser cannot be started
    pub async fn launch(options: ChromiumOptions) -> ProbeResult<Self> {
        let mut builder = CdpConfig::builder();
        if !options.headless {
            builder = builder.with_head();
        }
        if options.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = options.executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|message| ProbeError::BrowserLaunchError { message })?;

        let (browser, mut handler) =
            CdpBrowser::launch(config)
                .await
                .map_err(|e| ProbeError::BrowserLaunchError {
                    message: e.to_string(),
                })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "cdp handler stopped");
                    break;
                }
            }
        });
        tracing::info!(headless = options.headless, "chromium launched");

        Ok(Self {
            browser: Arc::new(Mutex::new(browser)),
            handler,
        })
    }

    /// Close the browser
    pub async fn close(self) -> ProbeResult<()> {
        let mut browser = self.browser.lock().await;
        browser
            .close()
            .await
            .map_err(|e| ProbeError::page(e.to_string()))?;
        self.handler.abort();
        Ok(())
    }
}

#[async_trait]
impl SessionFactory for ChromiumSessionFactory {
    async fn open(&self, retry: RetryConfig) -> ProbeResult<Page> {
        let browser = self.browser.lock().await;
        let context = browser
            .execute(CreateBrowserContextParams::default())
            .await
            .map_err(|e| ProbeError::page(format!("create browser context: {e}")))?
            .result
            .browser_context_id;
        let target = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context.clone())
            .build()
            .map_err(ProbeError::page)?;
        let page = browser
            .new_page(target)
            .await
            .map_err(|e| ProbeError::page(e.to_string()))?;
        drop(browser);

        let driver = ChromiumPage {
            page,
            context: Some(context),
            browser: Arc::clone(&self.browser),
            dialog_task: None,
        };
        Page::new(Box::new(driver), retry).await
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}

/// `{ id, tag, text, visible }` as returned by the locator resolver script
#[derive(Debug, Deserialize)]
struct ResolvedElement {
    id: String,
    tag: String,
    text: String,
    visible: bool,
}

impl From<ResolvedElement> for ElementHandle {
    fn from(el: ResolvedElement) -> Self {
        Self::new(el.id, el.tag)
            .with_text(el.text)
            .with_visible(el.visible)
    }
}

/// One page inside its own browser context
pub struct ChromiumPage {
    page: CdpPage,
    context: Option<BrowserContextId>,
    browser: Arc<Mutex<CdpBrowser>>,
    dialog_task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for ChromiumPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromiumPage")
            .field("context", &self.context)
            .finish()
    }
}

fn element_selector(element: &ElementHandle) -> String {
    format!("[data-blogprobe-id=\"{}\"]", element.id)
}

const fn dialog_type(kind: &CdpDialogType) -> DialogType {
    match kind {
        CdpDialogType::Alert => DialogType::Alert,
        CdpDialogType::Confirm => DialogType::Confirm,
        CdpDialogType::Prompt => DialogType::Prompt,
        CdpDialogType::Beforeunload => DialogType::BeforeUnload,
    }
}

#[async_trait]
impl PageDriver for ChromiumPage {
    async fn goto(&mut self, url: &str) -> ProbeResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ProbeError::NavigationError {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn query(&mut self, locator: &Locator) -> ProbeResult<Vec<ElementHandle>> {
        let found: Vec<ResolvedElement> = self
            .page
            .evaluate(locator.to_query())
            .await
            .map_err(|e| ProbeError::page(format!("resolve {locator}: {e}")))?
            .into_value()
            .map_err(|e| ProbeError::page(format!("resolve {locator}: {e}")))?;
        Ok(found.into_iter().map(ElementHandle::from).collect())
    }

    async fn click(&mut self, element: &ElementHandle) -> ProbeResult<()> {
        self.page
            .find_element(element_selector(element))
            .await
            .map_err(|e| ProbeError::page(format!("element {} is detached: {e}", element.id)))?
            .click()
            .await
            .map_err(|e| ProbeError::InputError {
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn fill(&mut self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
        let selector = element_selector(element);
        let select = format!(
            "(() => {{ const el = document.querySelector({}); el.focus(); el.select(); }})()",
            serde_json::Value::String(selector.clone())
        );
        self.page
            .evaluate(select)
            .await
            .map_err(|e| ProbeError::InputError {
                message: e.to_string(),
            })?;
        self.page
            .find_element(selector)
            .await
            .map_err(|e| ProbeError::page(format!("element {} is detached: {e}", element.id)))?
            .type_str(text)
            .await
            .map_err(|e| ProbeError::InputError {
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn install_dialog_handler(&mut self, handler: DialogHandler) -> ProbeResult<()> {
        let mut events = self
            .page
            .event_listener::<EventJavascriptDialogOpening>()
            .await
            .map_err(|e| ProbeError::page(e.to_string()))?;
        let page = self.page.clone();
        let task = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                let dialog = handler.handle(Dialog::new(dialog_type(&event.r#type), &event.message));
                let mut params = HandleJavaScriptDialogParams::new(dialog.is_accepted());
                if let crate::dialog::DialogAction::AcceptWith(text) = dialog.action() {
                    params.prompt_text = Some(text.clone());
                }
                if let Err(e) = page.execute(params).await {
                    tracing::warn!(error = %e, "failed to answer dialog");
                }
            }
        });
        if let Some(previous) = self.dialog_task.replace(task) {
            previous.abort();
        }
        Ok(())
    }

    async fn close(&mut self) -> ProbeResult<()> {
        if let Some(task) = self.dialog_task.take() {
            task.abort();
        }
        self.page
            .clone()
            .close()
            .await
            .map_err(|e| ProbeError::page(e.to_string()))?;
        if let Some(context) = self.context.take() {
            let browser = self.browser.lock().await;
            browser
                .execute(DisposeBrowserContextParams::new(context))
                .await
                .map_err(|e| ProbeError::page(format!("dispose browser context: {e}")))?;
        }
        Ok(())
    }
}
