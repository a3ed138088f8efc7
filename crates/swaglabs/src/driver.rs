//! SessionDriver - the browser automation contract the suites run against.
//!
//! All page actions go through this trait, so the same scenarios run against
//! a real Chromium session (`browser` feature) or the in-memory
//! [`MockStorefront`](crate::mock::MockStorefront) in unit tests.
//!
//! Operations are selector-addressed. A selector that matches nothing yields
//! [`SwagError::NoSuchElement`](crate::SwagError::NoSuchElement).

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::locator::Selector;
use crate::result::SwagResult;

/// Element handle for DOM interactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Selector the element was found by
    pub selector: Selector,
    /// Element tag name, when known
    pub tag_name: Option<String>,
    /// Element text content at lookup time
    pub text_content: Option<String>,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            tag_name: None,
            text_content: None,
        }
    }

    /// Attach the tag name
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag_name = Some(tag.into());
        self
    }

    /// Attach the text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }
}

/// Opaque identifier of a browser window or tab
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowHandle(pub String);

impl WindowHandle {
    /// Create a window handle
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Browser configuration for the driver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Timeout for navigation
    pub navigation_timeout: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            chromium_path: None,
            sandbox: true,
            navigation_timeout: Duration::from_secs(30),
        }
    }
}

impl DriverConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set navigation timeout
    #[must_use]
    pub const fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }
}

/// Browser automation contract
///
/// One implementation owns one browser session. Calls are issued
/// sequentially; `&mut self` methods change which page is current.
///
/// # Implementations
///
/// - `ChromiumDriver` - CDP via chromiumoxide (`browser` feature)
/// - `MockStorefront` - in-memory storefront for unit tests
#[async_trait]
pub trait SessionDriver: Send + Sync {
    /// Navigate the current window to URL
    async fn get(&mut self, url: &str) -> SwagResult<()>;

    /// Look up an element
    async fn find_element(&self, selector: &Selector) -> SwagResult<ElementHandle>;

    /// Click an element
    async fn click(&mut self, selector: &Selector) -> SwagResult<()>;

    /// Type text into an element
    async fn send_keys(&mut self, selector: &Selector, text: &str) -> SwagResult<()>;

    /// Rendered text of an element
    async fn text(&self, selector: &Selector) -> SwagResult<String>;

    /// Whether an element is rendered and visible
    async fn is_displayed(&self, selector: &Selector) -> SwagResult<bool>;

    /// Number of elements matching a selector
    async fn count(&self, selector: &Selector) -> SwagResult<usize>;

    /// `document.readyState` of the current page
    async fn ready_state(&self) -> SwagResult<String>;

    /// URL of the current window
    async fn current_url(&self) -> SwagResult<String>;

    /// PNG screenshot of the current window
    async fn screenshot(&self) -> SwagResult<Vec<u8>>;

    /// All open windows, in opening order
    async fn window_handles(&self) -> SwagResult<Vec<WindowHandle>>;

    /// The window commands currently target
    async fn current_window(&self) -> SwagResult<WindowHandle>;

    /// Make another window current
    async fn switch_to_window(&mut self, handle: &WindowHandle) -> SwagResult<()>;

    /// Close the current window
    async fn close_window(&mut self) -> SwagResult<()>;

    /// Go back in history
    async fn back(&mut self) -> SwagResult<()>;

    /// Go forward in history
    async fn forward(&mut self) -> SwagResult<()>;

    /// Reload the current page
    async fn refresh(&mut self) -> SwagResult<()>;

    /// End the session
    async fn quit(&mut self) -> SwagResult<()>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod element_handle_tests {
        use super::*;

        #[test]
        fn test_element_handle_creation() {
            let elem = ElementHandle::new(Selector::id("login-button"))
                .with_tag("input")
                .with_text("Login");
            assert_eq!(elem.selector, Selector::id("login-button"));
            assert_eq!(elem.tag_name.as_deref(), Some("input"));
            assert_eq!(elem.text_content.as_deref(), Some("Login"));
        }
    }

    mod window_handle_tests {
        use super::*;

        #[test]
        fn test_window_handle_display() {
            let handle = WindowHandle::new("tab-1");
            assert_eq!(handle.to_string(), "tab-1");
            assert_eq!(handle.as_str(), "tab-1");
        }
    }

    mod driver_config_tests {
        use super::*;

        #[test]
        fn test_config_default() {
            let config = DriverConfig::default();
            assert!(config.headless);
            assert!(config.sandbox);
            assert_eq!(config.viewport_width, 1920);
            assert_eq!(config.viewport_height, 1080);
        }

        #[test]
        fn test_config_builder() {
            let config = DriverConfig::new()
                .headless(false)
                .viewport(800, 600)
                .chromium_path("/usr/bin/chromium")
                .no_sandbox()
                .navigation_timeout(Duration::from_secs(5));

            assert!(!config.headless);
            assert!(!config.sandbox);
            assert_eq!(config.viewport_width, 800);
            assert_eq!(config.viewport_height, 600);
            assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
            assert_eq!(config.navigation_timeout, Duration::from_secs(5));
        }
    }
}
