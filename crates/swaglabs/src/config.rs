//! Target site configuration.
//!
//! Defaults are the storefront's public demo URL and accounts. A YAML file
//! may override any subset of fields.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::result::{SwagError, SwagResult};

/// Public demo storefront
pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com/";

/// Account that can log in
pub const STANDARD_USER: &str = "standard_user";

/// Account the site refuses
pub const LOCKED_OUT_USER: &str = "locked_out_user";

/// Password shared by every demo account
pub const DEFAULT_PASSWORD: &str = "secret_sauce";

/// Directory screenshots are written to
pub const DEFAULT_SCREENSHOT_DIR: &str = "documentation";

/// Login credentials used by the suites
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Account that can log in
    pub standard_user: String,
    /// Account the site refuses
    pub locked_out_user: String,
    /// Password for both accounts
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            standard_user: STANDARD_USER.to_string(),
            locked_out_user: LOCKED_OUT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
        }
    }
}

/// Pauses and wait bounds, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Fixed pause after opening the sort dropdown
    pub settle_ms: u64,
    /// Wait for sidebar links to become visible
    pub menu_wait_ms: u64,
    /// Wait for the cart badge to appear
    pub badge_wait_ms: u64,
    /// Wait for `document.readyState == "complete"`
    pub page_ready_ms: u64,
    /// Polling interval for waits
    pub poll_interval_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle_ms: 1000,
            menu_wait_ms: 2000,
            badge_wait_ms: 5000,
            page_ready_ms: 10_000,
            poll_interval_ms: 50,
        }
    }
}

impl Timing {
    /// Zero pauses and short waits, for in-memory runs
    #[must_use]
    pub const fn instant() -> Self {
        Self {
            settle_ms: 0,
            menu_wait_ms: 200,
            badge_wait_ms: 200,
            page_ready_ms: 200,
            poll_interval_ms: 1,
        }
    }

    /// Settle pause as a Duration
    #[must_use]
    pub const fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Everything the suites need to know about the target site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Landing page / login page URL
    pub base_url: String,
    /// Demo accounts
    pub credentials: Credentials,
    /// Output directory for screenshots
    pub screenshot_dir: PathBuf,
    /// Pauses and wait bounds
    pub timing: Timing,
    /// Seed for randomized interactions (None = from entropy)
    pub seed: Option<u64>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: Credentials::default(),
            screenshot_dir: PathBuf::from(DEFAULT_SCREENSHOT_DIR),
            timing: Timing::default(),
            seed: None,
        }
    }
}

impl SiteConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML document
    pub fn from_yaml(yaml: &str) -> SwagResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    pub fn load(path: &Path) -> SwagResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> SwagResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the screenshot directory
    #[must_use]
    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    /// Set timing
    #[must_use]
    pub const fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Set the RNG seed
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> SwagResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(SwagError::Config {
                message: format!("base_url must be http(s), got {:?}", self.base_url),
            });
        }
        if self.timing.poll_interval_ms == 0 {
            return Err(SwagError::Config {
                message: "timing.poll_interval_ms must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Absolute URL of a path on the site, e.g. `/inventory.html`
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_the_demo_site() {
        let config = SiteConfig::default();
        assert_eq!(config.base_url, "https://www.saucedemo.com/");
        assert_eq!(config.credentials.standard_user, "standard_user");
        assert_eq!(config.credentials.locked_out_user, "locked_out_user");
        assert_eq!(config.credentials.password, "secret_sauce");
        assert_eq!(config.screenshot_dir, PathBuf::from("documentation"));
        assert_eq!(config.timing.badge_wait_ms, 5000);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_url_for() {
        let config = SiteConfig::default();
        assert_eq!(
            config.url_for("/inventory.html"),
            "https://www.saucedemo.com/inventory.html"
        );
        assert_eq!(
            config.url_for("cart.html"),
            "https://www.saucedemo.com/cart.html"
        );
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = SiteConfig::from_yaml(
            "base_url: http://localhost:3000/\nseed: 7\ntiming:\n  settle_ms: 10\n",
        )
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:3000/");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.timing.settle_ms, 10);
        assert_eq!(config.timing.menu_wait_ms, 2000);
        assert_eq!(config.credentials, Credentials::default());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = SiteConfig::default().with_seed(42);
        let yaml = config.to_yaml().unwrap();
        assert_eq!(SiteConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_invalid_base_url() {
        let err = SiteConfig::from_yaml("base_url: ftp://example.com\n").unwrap_err();
        assert!(matches!(err, SwagError::Config { .. }));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = SiteConfig::from_yaml("base_url: [").unwrap_err();
        assert!(matches!(err, SwagError::Yaml(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.yaml");
        std::fs::write(&path, "screenshot_dir: shots\n").unwrap();
        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.screenshot_dir, PathBuf::from("shots"));
    }
}
