//! Swaglabs: end-to-end scenario suites for the Sauce Labs demo storefront.
//!
//! The crate drives the storefront at <https://www.saucedemo.com/> through a
//! [`SessionDriver`] and checks login, sorting, cart, navigation and menu
//! behaviour. Elements are addressed by name through a [`LocatorRegistry`];
//! [`Session`] wraps the page actions, [`verify`](crate::verify_order) holds
//! the pure ordering checks, and [`SuiteRunner`] runs the three suites into a
//! [`RunReport`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────────┐   ┌───────────────┐
//! │ SuiteRunner │──►│   suites    │──►│   Session    │──►│ SessionDriver │
//! │ (Login,     │   │ (scenario   │   │ (locators,   │   │ Chromium or   │
//! │  Home, Cart)│   │  bodies)    │   │  waits, rng) │   │ MockStorefront│
//! └─────────────┘   └─────────────┘   └──────────────┘   └───────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use swaglabs::{mock::MockStorefront, Session, SiteConfig, Suite, SuiteRunner, Timing};
//!
//! # async fn demo() -> swaglabs::SwagResult<()> {
//! let config = SiteConfig::default()
//!     .with_timing(Timing::instant())
//!     .with_seed(7);
//! let session = Session::new(MockStorefront::new(), config);
//! let report = SuiteRunner::new(session).run(&[Suite::Login]).await?;
//! assert!(report.all_passed());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod actions;
#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc)]
mod browser;
#[allow(clippy::missing_errors_doc)]
mod config;
mod driver;
#[allow(clippy::missing_errors_doc)]
mod fixture;
#[cfg(test)]
mod flaky;
mod harness;
#[allow(clippy::missing_errors_doc, clippy::doc_markdown)]
mod locator;
mod result;
#[allow(clippy::missing_errors_doc)]
mod scenario;
#[allow(clippy::missing_errors_doc)]
mod screenshot;
#[allow(clippy::missing_errors_doc)]
mod verify;
#[allow(clippy::missing_errors_doc)]
mod wait;
mod window;

/// In-memory storefront implementing [`SessionDriver`]
///
/// Reproduces the storefront's login rules, listing, cart and menu closely
/// enough to run every suite without a browser.
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::too_many_lines
)]
pub mod mock;

/// Scenario bodies, one function per scenario
///
/// Each function expects the session state its suite establishes and
/// reports failure as an error.
#[allow(clippy::missing_errors_doc)]
pub mod suites;

pub use actions::{
    host_matches, url_path, BadgeState, HistoryMove, NavigationOutcome, NavigationStep, Session,
};
#[cfg(feature = "browser")]
pub use browser::ChromiumDriver;
pub use config::{
    Credentials, SiteConfig, Timing, DEFAULT_BASE_URL, DEFAULT_PASSWORD, DEFAULT_SCREENSHOT_DIR,
    LOCKED_OUT_USER, STANDARD_USER,
};
pub use driver::{DriverConfig, ElementHandle, SessionDriver, WindowHandle};
pub use fixture::SuiteContext;
pub use harness::{RunReport, ScenarioResult, SuiteResults};
pub use locator::{names, LocatorDef, LocatorMatch, LocatorRegistry, Selector};
pub use result::{SwagError, SwagResult};
pub use scenario::{Scenario, Suite, SuiteRunner};
pub use screenshot::ScreenshotStore;
pub use verify::{
    expected_name_order, expected_price_order, verify_order, Price, Product, ProductSnapshot,
    SortOrder,
};
pub use wait::{
    wait_for_element, wait_for_new_window, wait_for_page_ready, wait_for_url, wait_for_visible,
    WaitOptions, WaitResult, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
};
pub use window::WindowStack;
