//! Page actions: storefront-level operations over one driver session.
//!
//! A [`Session`] owns the driver together with everything an action needs:
//! the locator registry, site configuration, screenshot store, window stack
//! and the seeded random source used for randomized clicking. Scenarios are
//! written entirely in terms of these actions.

use std::fmt;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::SiteConfig;
use crate::driver::{SessionDriver, WindowHandle};
use crate::locator::{names, LocatorRegistry, Selector};
use crate::result::{SwagError, SwagResult};
use crate::screenshot::ScreenshotStore;
use crate::verify::SortOrder;
use crate::wait::{
    wait_for_element, wait_for_new_window, wait_for_page_ready, wait_for_url, wait_for_visible,
    WaitOptions, WaitResult,
};
use crate::window::WindowStack;

/// History movement in a navigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryMove {
    /// Browser back
    Back,
    /// Browser forward
    Forward,
}

/// One navigation: an optional URL, then an optional click, then an
/// optional history move
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationStep {
    url: Option<String>,
    click: Option<Selector>,
    history: Option<HistoryMove>,
}

impl NavigationStep {
    /// Empty step
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a URL
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Click an element
    #[must_use]
    pub fn click(mut self, selector: Selector) -> Self {
        self.click = Some(selector);
        self
    }

    /// Go back in history
    #[must_use]
    pub const fn back(mut self) -> Self {
        self.history = Some(HistoryMove::Back);
        self
    }

    /// Go forward in history
    #[must_use]
    pub const fn forward(mut self) -> Self {
        self.history = Some(HistoryMove::Forward);
        self
    }

    /// Whether the step does nothing
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.url.is_none() && self.click.is_none() && self.history.is_none()
    }
}

impl fmt::Display for NavigationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(url) = &self.url {
            parts.push(format!("get {url}"));
        }
        if let Some(selector) = &self.click {
            parts.push(format!("click {selector}"));
        }
        match self.history {
            Some(HistoryMove::Back) => parts.push("back".to_string()),
            Some(HistoryMove::Forward) => parts.push("forward".to_string()),
            None => {}
        }
        if parts.is_empty() {
            f.write_str("noop")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// Result of a navigation step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationOutcome {
    /// Every part of the step succeeded
    Completed,
    /// A part of the step failed; the failure was logged
    Failed {
        /// The step that was attempted
        step: String,
        /// Why it failed
        reason: String,
    },
}

impl NavigationOutcome {
    /// Whether the step completed
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Turn a failed step into an error
    pub fn require(self) -> SwagResult<()> {
        match self {
            Self::Completed => Ok(()),
            Self::Failed { step, reason } => Err(SwagError::NavigationError {
                url: step,
                message: reason,
            }),
        }
    }
}

/// Rendering state of the cart badge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BadgeState {
    /// Not in the DOM
    Absent,
    /// In the DOM but not visible
    Hidden,
    /// Visible with this text
    Shown(String),
}

impl BadgeState {
    /// Whether the badge element is gone
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Path component of a URL
#[must_use]
pub fn url_path(url: &str) -> Option<String> {
    Url::parse(url).ok().map(|u| u.path().to_string())
}

/// Whether `url`'s host is `domain` or a subdomain of it
#[must_use]
pub fn host_matches(url: &str, domain: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .is_some_and(|host| host == domain || host.ends_with(&format!(".{domain}")))
}

/// A driver session plus the state page actions share
#[derive(Debug)]
pub struct Session<D: SessionDriver> {
    driver: D,
    registry: LocatorRegistry,
    config: SiteConfig,
    screenshots: ScreenshotStore,
    windows: WindowStack,
    rng: StdRng,
}

impl<D: SessionDriver> Session<D> {
    /// Wrap a driver; the random source is seeded from `config.seed` or,
    /// without one, from OS entropy
    #[must_use]
    pub fn new(driver: D, config: SiteConfig) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            driver,
            registry: LocatorRegistry::storefront(),
            screenshots: ScreenshotStore::new(config.screenshot_dir.clone()),
            config,
            windows: WindowStack::default(),
            rng,
        }
    }

    /// The underlying driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Release the driver
    #[must_use]
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Site configuration
    #[must_use]
    pub const fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Locator registry
    #[must_use]
    pub const fn registry(&self) -> &LocatorRegistry {
        &self.registry
    }

    fn wait_options(&self, timeout_ms: u64) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(timeout_ms)
            .with_poll_interval(self.config.timing.poll_interval_ms)
    }

    // ------------------------------------------------------------------
    // Element primitives
    // ------------------------------------------------------------------

    /// Selector of a static locator
    pub fn selector(&self, name: &str) -> SwagResult<Selector> {
        self.registry.resolve(name)
    }

    /// Selector of position `index` of an indexed locator
    pub fn nth(&self, name: &str, index: usize, count: usize) -> SwagResult<Selector> {
        self.registry.resolve_nth(name, index, count)
    }

    /// Click a static locator
    pub async fn click(&mut self, name: &str) -> SwagResult<()> {
        let selector = self.selector(name)?;
        debug!(locator = name, %selector, "click");
        self.driver.click(&selector).await
    }

    /// Click position `index` of an indexed locator
    pub async fn click_nth(&mut self, name: &str, index: usize, count: usize) -> SwagResult<()> {
        let selector = self.nth(name, index, count)?;
        debug!(locator = name, index, "click");
        self.driver.click(&selector).await
    }

    /// Text of a static locator
    pub async fn text(&self, name: &str) -> SwagResult<String> {
        self.driver.text(&self.selector(name)?).await
    }

    /// Text of position `index` of an indexed locator
    pub async fn text_nth(&self, name: &str, index: usize, count: usize) -> SwagResult<String> {
        self.driver.text(&self.nth(name, index, count)?).await
    }

    /// Number of rendered elements for a locator
    pub async fn count(&self, name: &str) -> SwagResult<usize> {
        self.driver.count(&self.registry.resolve_all(name)?).await
    }

    /// Whether a static locator is in the DOM right now
    pub async fn is_present(&self, name: &str) -> SwagResult<bool> {
        match self.driver.find_element(&self.selector(name)?).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// URL of the current window
    pub async fn current_url(&self) -> SwagResult<String> {
        self.driver.current_url().await
    }

    // ------------------------------------------------------------------
    // Waits
    // ------------------------------------------------------------------

    /// Wait for `document.readyState == "complete"`
    pub async fn wait_for_page_ready(&self) -> SwagResult<WaitResult> {
        let options = self.wait_options(self.config.timing.page_ready_ms);
        wait_for_page_ready(&self.driver, options).await
    }

    /// Wait for a static locator to become visible
    pub async fn wait_for_visible(&self, name: &str, timeout_ms: u64) -> SwagResult<WaitResult> {
        let selector = self.selector(name)?;
        wait_for_visible(&self.driver, &selector, self.wait_options(timeout_ms)).await
    }

    // ------------------------------------------------------------------
    // Storefront actions
    // ------------------------------------------------------------------

    /// Load the landing page and wait for it
    pub async fn open(&mut self) -> SwagResult<()> {
        let url = self.config.base_url.clone();
        info!(%url, "opening storefront");
        self.driver.get(&url).await?;
        self.wait_for_page_ready().await?;
        Ok(())
    }

    /// Fill whichever credentials are non-empty and submit. The outcome is
    /// left for the caller to inspect.
    pub async fn login(&mut self, username: &str, password: &str) -> SwagResult<()> {
        debug!(username, with_password = !password.is_empty(), "login");
        if !username.is_empty() {
            let field = self.selector(names::USER_NAME_FIELD)?;
            self.driver.send_keys(&field, username).await?;
        }
        if !password.is_empty() {
            let field = self.selector(names::PASSWORD_FIELD)?;
            self.driver.send_keys(&field, password).await?;
        }
        self.click(names::LOGIN_BUTTON).await
    }

    /// Log in as the configured standard user
    pub async fn login_standard(&mut self) -> SwagResult<()> {
        let user = self.config.credentials.standard_user.clone();
        let password = self.config.credentials.password.clone();
        self.login(&user, &password).await
    }

    /// Open the burger menu, wait for `item` to show, click it
    pub async fn open_menu_item(&mut self, item: &str) -> SwagResult<()> {
        self.click(names::MENU_BUTTON).await?;
        self.wait_for_visible(item, self.config.timing.menu_wait_ms)
            .await?;
        self.click(item).await
    }

    /// Close the burger menu
    pub async fn close_menu(&mut self) -> SwagResult<()> {
        self.wait_for_visible(names::MENU_CLOSE_BUTTON, self.config.timing.menu_wait_ms)
            .await?;
        self.click(names::MENU_CLOSE_BUTTON).await
    }

    /// Log out through the burger menu
    pub async fn logout(&mut self) -> SwagResult<()> {
        info!("logging out");
        self.open_menu_item(names::LOGOUT_LINK).await
    }

    /// Reload the current page and wait for it
    pub async fn refresh(&mut self) -> SwagResult<()> {
        self.driver.refresh().await?;
        self.wait_for_page_ready().await?;
        Ok(())
    }

    /// Texts of positions `1..=count` of an indexed locator, in DOM order
    pub async fn collect_texts(&self, name: &str, count: usize) -> SwagResult<Vec<String>> {
        let mut texts = Vec::with_capacity(count);
        for index in 1..=count {
            texts.push(self.text_nth(name, index, count).await?);
        }
        Ok(texts)
    }

    /// Uniformly random position in `[1, count]`
    pub fn random_index(&mut self, name: &str, count: usize) -> SwagResult<usize> {
        if count == 0 {
            return Err(SwagError::IndexOutOfRange {
                name: name.to_string(),
                index: 0,
                count,
            });
        }
        Ok(self.rng.gen_range(1..=count))
    }

    /// Click `count` uniformly random positions of an indexed locator.
    /// Returns the positions in click order.
    pub async fn click_randomly(&mut self, name: &str, count: usize) -> SwagResult<Vec<usize>> {
        let mut picks = Vec::with_capacity(count);
        for _ in 0..count {
            let index = self.random_index(name, count)?;
            self.click_nth(name, index, count).await?;
            picks.push(index);
        }
        debug!(locator = name, ?picks, "random clicks");
        Ok(picks)
    }

    /// Open the sort dropdown, let it settle, pick `order`
    pub async fn apply_sort(&mut self, order: SortOrder) -> SwagResult<()> {
        info!(%order, "sorting products");
        self.click(names::SORT_SELECT).await?;
        tokio::time::sleep(self.config.timing.settle()).await;
        self.click(order.option_locator()).await
    }

    /// Capture the current window into the screenshot directory
    pub async fn capture_screenshot(&self, name: &str) -> SwagResult<PathBuf> {
        let png = self.driver.screenshot().await?;
        let path = self.screenshots.save(name, &png)?;
        info!(name, path = %path.display(), "screenshot captured");
        Ok(path)
    }

    /// Run a navigation step. Failures are logged and reported in the
    /// outcome; only fatal session errors are returned as `Err`.
    pub async fn navigate(&mut self, step: &NavigationStep) -> SwagResult<NavigationOutcome> {
        match self.run_step(step).await {
            Ok(()) => {
                debug!(%step, "navigation completed");
                Ok(NavigationOutcome::Completed)
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(%step, error = %e, "navigation failed");
                Ok(NavigationOutcome::Failed {
                    step: step.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Navigate by clicking a static locator
    pub async fn follow(&mut self, name: &str) -> SwagResult<NavigationOutcome> {
        let step = NavigationStep::new().click(self.selector(name)?);
        self.navigate(&step).await
    }

    async fn run_step(&mut self, step: &NavigationStep) -> SwagResult<()> {
        if let Some(url) = &step.url {
            self.driver.get(url).await?;
        }
        if let Some(selector) = &step.click {
            self.driver.click(selector).await?;
        }
        match step.history {
            Some(HistoryMove::Back) => self.driver.back().await?,
            Some(HistoryMove::Forward) => self.driver.forward().await?,
            None => {}
        }
        if !step.is_empty() {
            self.wait_for_page_ready().await?;
        }
        Ok(())
    }

    /// Current state of the cart badge; a missing element is `Absent`
    pub async fn cart_badge(&self) -> SwagResult<BadgeState> {
        let selector = self.selector(names::CART_BADGE)?;
        match self.driver.is_displayed(&selector).await {
            Ok(true) => Ok(BadgeState::Shown(self.driver.text(&selector).await?)),
            Ok(false) => Ok(BadgeState::Hidden),
            Err(e) if e.is_not_found() => Ok(BadgeState::Absent),
            Err(e) => Err(e),
        }
    }

    /// Wait for the cart badge to show and return its text
    pub async fn wait_for_cart_badge(&self) -> SwagResult<String> {
        self.wait_for_visible(names::CART_BADGE, self.config.timing.badge_wait_ms)
            .await?;
        self.text(names::CART_BADGE).await
    }

    /// Click a link that opens a new window, then make that window current.
    /// If the switch fails the new window is closed before the error returns.
    pub async fn open_in_new_window(&mut self, name: &str) -> SwagResult<WindowHandle> {
        if self.windows.is_empty() {
            self.windows = WindowStack::new(self.driver.current_window().await?);
        }
        let known = self.driver.window_handles().await?;
        self.click(name).await?;

        let options = self.wait_options(self.config.timing.menu_wait_ms);
        let (handle, _) = wait_for_new_window(&self.driver, &known, options).await?;
        self.windows.push(handle.clone())?;
        if let Err(e) = self.driver.switch_to_window(&handle).await {
            warn!(window = %handle, error = %e, "switch to new window failed, closing it");
            if let Err(cleanup) = self.close_secondary_window().await {
                warn!(window = %handle, error = %cleanup, "could not close new window");
            }
            return Err(e);
        }
        info!(locator = name, window = %handle, "switched to new window");
        Ok(handle)
    }

    /// Close the most recently opened window and return to its parent.
    /// The switch back is attempted even if the close fails.
    pub async fn close_secondary_window(&mut self) -> SwagResult<WindowHandle> {
        let (closed, parent) = self.windows.pop()?;
        let close_result = self.close_window(&closed).await;
        self.driver.switch_to_window(&parent).await?;
        close_result?;
        debug!(closed = %closed, current = %parent, "closed secondary window");
        Ok(parent)
    }

    async fn close_window(&mut self, handle: &WindowHandle) -> SwagResult<()> {
        if &self.driver.current_window().await? != handle {
            self.driver.switch_to_window(handle).await?;
        }
        self.driver.close_window().await
    }

    /// Number of windows tracked by the window stack
    #[must_use]
    pub fn window_depth(&self) -> usize {
        self.windows.depth()
    }

    // ------------------------------------------------------------------
    // State markers
    // ------------------------------------------------------------------

    /// Wait until the current URL is `path` on the configured site
    pub async fn expect_path(&self, path: &str) -> SwagResult<()> {
        let expected = url_path(&self.config.url_for(path));
        let options = self.wait_options(self.config.timing.page_ready_ms);
        let matched = wait_for_url(
            &self.driver,
            path,
            |url| url_path(url) == expected,
            options,
        )
        .await;
        match matched {
            Ok(_) => Ok(()),
            Err(SwagError::Timeout { .. }) => {
                let url = self.driver.current_url().await?;
                Err(SwagError::assertion(format!(
                    "expected path {path}, current URL is {url}"
                )))
            }
            Err(e) => Err(e),
        }
    }

    /// Whether the current URL is `path` on the configured site
    pub async fn on_path(&self, path: &str) -> SwagResult<bool> {
        let url = self.driver.current_url().await?;
        Ok(url_path(&url) == url_path(&self.config.url_for(path)))
    }

    /// Wait until the current URL's host is one of `domains` (or a
    /// subdomain); returns the URL
    pub async fn expect_host(&self, domains: &[&str]) -> SwagResult<String> {
        let options = self.wait_options(self.config.timing.page_ready_ms);
        let matched = wait_for_url(
            &self.driver,
            &domains.join(" or "),
            |url| domains.iter().any(|d| host_matches(url, d)),
            options,
        )
        .await;
        let url = self.driver.current_url().await?;
        match matched {
            Ok(_) => Ok(url),
            Err(SwagError::Timeout { .. }) => Err(SwagError::assertion(format!(
                "expected a page on {}, current URL is {url}",
                domains.join(" or ")
            ))),
            Err(e) => Err(e),
        }
    }

    /// Check a static locator's text
    pub async fn expect_text(&self, name: &str, expected: &str) -> SwagResult<()> {
        let actual = self.text(name).await?;
        if actual == expected {
            Ok(())
        } else {
            Err(SwagError::assertion(format!(
                "{name}: expected {expected:?}, got {actual:?}"
            )))
        }
    }

    /// Wait until a static locator is in the DOM
    pub async fn expect_present(&self, name: &str) -> SwagResult<()> {
        let selector = self.selector(name)?;
        let options = self.wait_options(self.config.timing.page_ready_ms);
        match wait_for_element(&self.driver, &selector, options).await {
            Ok(_) => Ok(()),
            Err(SwagError::Timeout { ms, .. }) => Err(SwagError::assertion(format!(
                "{name} not present after {ms}ms"
            ))),
            Err(e) => Err(e),
        }
    }

    /// End the driver session
    pub async fn quit(&mut self) -> SwagResult<()> {
        info!("closing browser session");
        self.driver.quit().await
    }
}
