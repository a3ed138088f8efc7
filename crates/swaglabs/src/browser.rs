//! Chromium session over the DevTools protocol.
//!
//! Each browser tab is one window; its CDP target id is the window handle.
//! Element work runs as page-side JavaScript built from
//! [`Selector::to_query`], so id, CSS and XPath selectors share one path.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::input::InsertTextParams;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::driver::{DriverConfig, ElementHandle, SessionDriver, WindowHandle};
use crate::locator::Selector;
use crate::result::{SwagError, SwagResult};

/// What the page reports about one selector
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct Probe {
    found: bool,
    tag: String,
    text: String,
    visible: bool,
}

/// Outcome of a page-side click or focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Interaction {
    Missing,
    Hidden,
    Done,
}

fn probe_script(selector: &Selector) -> String {
    format!(
        "(() => {{ const el = {}; \
         if (el === null) return {{ found: false, tag: '', text: '', visible: false }}; \
         const style = window.getComputedStyle(el); \
         const visible = el.getClientRects().length > 0 \
           && style.visibility !== 'hidden' && style.display !== 'none'; \
         const text = (el.innerText ?? el.textContent ?? '').trim(); \
         return {{ found: true, tag: el.tagName.toLowerCase(), text, visible }}; }})()",
        selector.to_query()
    )
}

/// Options are picked through their select so React sees a change event.
fn click_script(selector: &Selector) -> String {
    format!(
        "(() => {{ const el = {}; \
         if (el === null) return 'missing'; \
         if (el.tagName === 'OPTION') {{ \
           const select = el.closest('select'); \
           if (select === null) return 'hidden'; \
           el.selected = true; \
           select.dispatchEvent(new Event('change', {{ bubbles: true }})); \
           return 'done'; }} \
         if (el.getClientRects().length === 0) return 'hidden'; \
         el.scrollIntoView({{ block: 'center' }}); \
         el.click(); \
         return 'done'; }})()",
        selector.to_query()
    )
}

fn focus_script(selector: &Selector) -> String {
    format!(
        "(() => {{ const el = {}; \
         if (el === null) return 'missing'; \
         if (el.getClientRects().length === 0 || el.disabled) return 'hidden'; \
         el.focus(); \
         return 'done'; }})()",
        selector.to_query()
    )
}

fn cdp_error(context: &str, err: impl std::fmt::Display) -> SwagError {
    SwagError::cdp(format!("{context}: {err}"))
}

fn target_handle(page: &Page) -> WindowHandle {
    WindowHandle::new(page.target_id().inner().clone())
}

/// Chromium-backed [`SessionDriver`]
pub struct ChromiumDriver {
    browser: Browser,
    handler: Option<JoinHandle<()>>,
    current: Option<Page>,
    opened: Vec<WindowHandle>,
    config: DriverConfig,
}

impl std::fmt::Debug for ChromiumDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromiumDriver")
            .field("opened", &self.opened)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ChromiumDriver {
    /// Launch Chromium and open one blank tab
    ///
    /// # Errors
    ///
    /// Returns [`SwagError::BrowserLaunchError`] if Chromium cannot start
    pub async fn launch(config: DriverConfig) -> SwagResult<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .request_timeout(config.navigation_timeout);
        if !config.headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder
            .build()
            .map_err(|message| SwagError::BrowserLaunchError { message })?;

        let (browser, mut handler) =
            Browser::launch(cdp_config)
                .await
                .map_err(|e| SwagError::BrowserLaunchError {
                    message: e.to_string(),
                })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| SwagError::BrowserLaunchError {
                message: e.to_string(),
            })?;
        let primary = target_handle(&page);
        info!(headless = config.headless, window = %primary, "chromium launched");

        Ok(Self {
            browser,
            handler: Some(handler),
            current: Some(page),
            opened: vec![primary],
            config,
        })
    }

    /// The launch configuration
    #[must_use]
    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }

    fn page(&self) -> SwagResult<&Page> {
        self.current
            .as_ref()
            .ok_or_else(|| SwagError::WindowError {
                message: "no current window".to_string(),
            })
    }

    async fn eval<T: serde::de::DeserializeOwned>(&self, script: String) -> SwagResult<T> {
        let result = self
            .page()?
            .evaluate(script)
            .await
            .map_err(|e| cdp_error("evaluate", e))?;
        result
            .into_value::<T>()
            .map_err(|e| cdp_error("evaluate result", e))
    }

    async fn probe(&self, selector: &Selector) -> SwagResult<Probe> {
        self.eval(probe_script(selector)).await
    }

    async fn interact(&self, selector: &Selector, script: String) -> SwagResult<()> {
        match self.eval::<Interaction>(script).await? {
            Interaction::Done => Ok(()),
            Interaction::Missing => Err(SwagError::no_such_element(selector.to_string())),
            Interaction::Hidden => Err(SwagError::ElementNotInteractable {
                selector: selector.to_string(),
            }),
        }
    }

    /// Refresh the opening-order list from the browser's live pages
    async fn live_pages(&mut self) -> SwagResult<Vec<Page>> {
        let pages = self
            .browser
            .pages()
            .await
            .map_err(|e| cdp_error("list pages", e))?;
        let live: Vec<WindowHandle> = pages.iter().map(target_handle).collect();
        self.opened.retain(|h| live.contains(h));
        for handle in live {
            if !self.opened.contains(&handle) {
                debug!(window = %handle, "discovered window");
                self.opened.push(handle);
            }
        }
        Ok(pages)
    }
}

#[async_trait]
impl SessionDriver for ChromiumDriver {
    async fn get(&mut self, url: &str) -> SwagResult<()> {
        let timeout = self.config.navigation_timeout;
        let page = self.page()?;
        let navigation = tokio::time::timeout(timeout, page.goto(url))
            .await
            .map_err(|_| SwagError::NavigationError {
                url: url.to_string(),
                message: format!("no response within {}ms", timeout.as_millis()),
            })?;
        navigation.map_err(|e| SwagError::NavigationError {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    async fn find_element(&self, selector: &Selector) -> SwagResult<ElementHandle> {
        let probe = self.probe(selector).await?;
        if !probe.found {
            return Err(SwagError::no_such_element(selector.to_string()));
        }
        Ok(ElementHandle::new(selector.clone())
            .with_tag(probe.tag)
            .with_text(probe.text))
    }

    async fn click(&mut self, selector: &Selector) -> SwagResult<()> {
        debug!(%selector, "click");
        self.interact(selector, click_script(selector)).await
    }

    async fn send_keys(&mut self, selector: &Selector, text: &str) -> SwagResult<()> {
        self.interact(selector, focus_script(selector)).await?;
        self.page()?
            .execute(InsertTextParams::new(text))
            .await
            .map_err(|e| cdp_error("insert text", e))?;
        Ok(())
    }

    async fn text(&self, selector: &Selector) -> SwagResult<String> {
        let probe = self.probe(selector).await?;
        if !probe.found {
            return Err(SwagError::no_such_element(selector.to_string()));
        }
        Ok(probe.text)
    }

    async fn is_displayed(&self, selector: &Selector) -> SwagResult<bool> {
        let probe = self.probe(selector).await?;
        if !probe.found {
            return Err(SwagError::no_such_element(selector.to_string()));
        }
        Ok(probe.visible)
    }

    async fn count(&self, selector: &Selector) -> SwagResult<usize> {
        self.eval(selector.to_count_query()).await
    }

    async fn ready_state(&self) -> SwagResult<String> {
        self.eval("document.readyState".to_string()).await
    }

    async fn current_url(&self) -> SwagResult<String> {
        let url = self
            .page()?
            .url()
            .await
            .map_err(|e| cdp_error("read url", e))?;
        Ok(url.unwrap_or_default())
    }

    async fn screenshot(&self) -> SwagResult<Vec<u8>> {
        use base64::Engine;

        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let capture = self
            .page()?
            .execute(params)
            .await
            .map_err(|e| SwagError::ScreenshotError {
                message: e.to_string(),
            })?;
        base64::engine::general_purpose::STANDARD
            .decode(&capture.data)
            .map_err(|e| SwagError::ScreenshotError {
                message: e.to_string(),
            })
    }

    async fn window_handles(&self) -> SwagResult<Vec<WindowHandle>> {
        let pages = self
            .browser
            .pages()
            .await
            .map_err(|e| cdp_error("list pages", e))?;
        let live: Vec<WindowHandle> = pages.iter().map(target_handle).collect();
        let mut handles: Vec<WindowHandle> = self
            .opened
            .iter()
            .filter(|h| live.contains(h))
            .cloned()
            .collect();
        for handle in live {
            if !handles.contains(&handle) {
                handles.push(handle);
            }
        }
        Ok(handles)
    }

    async fn current_window(&self) -> SwagResult<WindowHandle> {
        Ok(target_handle(self.page()?))
    }

    async fn switch_to_window(&mut self, handle: &WindowHandle) -> SwagResult<()> {
        let pages = self.live_pages().await?;
        let page = pages
            .into_iter()
            .find(|p| target_handle(p) == *handle)
            .ok_or_else(|| SwagError::WindowError {
                message: format!("no window {handle}"),
            })?;
        if let Err(e) = page.bring_to_front().await {
            warn!(window = %handle, error = %e, "could not bring window to front");
        }
        self.current = Some(page);
        Ok(())
    }

    async fn close_window(&mut self) -> SwagResult<()> {
        let page = self.current.take().ok_or_else(|| SwagError::WindowError {
            message: "no current window".to_string(),
        })?;
        let handle = target_handle(&page);
        page.close().await.map_err(|e| SwagError::WindowError {
            message: format!("close {handle}: {e}"),
        })?;
        self.opened.retain(|h| *h != handle);
        Ok(())
    }

    async fn back(&mut self) -> SwagResult<()> {
        self.page()?
            .evaluate("history.back()")
            .await
            .map_err(|e| cdp_error("history back", e))?;
        Ok(())
    }

    async fn forward(&mut self) -> SwagResult<()> {
        self.page()?
            .evaluate("history.forward()")
            .await
            .map_err(|e| cdp_error("history forward", e))?;
        Ok(())
    }

    async fn refresh(&mut self) -> SwagResult<()> {
        self.page()?
            .reload()
            .await
            .map_err(|e| cdp_error("reload", e))?;
        Ok(())
    }

    async fn quit(&mut self) -> SwagResult<()> {
        self.current = None;
        self.opened.clear();
        let closed = self.browser.close().await;
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        closed.map_err(|e| SwagError::session(format!("close browser: {e}")))?;
        info!("chromium closed");
        Ok(())
    }
}

impl Drop for ChromiumDriver {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}
