//! Result and error types for the storefront suites.

use thiserror::Error;

/// Result type for storefront operations
pub type SwagResult<T> = Result<T, SwagError>;

/// Errors that can occur while driving the storefront
#[derive(Debug, Error)]
pub enum SwagError {
    /// No locator registered under this name
    #[error("Unknown locator: {name}")]
    UnknownLocator {
        /// Requested locator name
        name: String,
    },

    /// Index outside `[1, count]` for a repeated element
    #[error("Index {index} out of range for locator {name} (1..={count})")]
    IndexOutOfRange {
        /// Locator name
        name: String,
        /// Requested index
        index: usize,
        /// Number of rendered elements
        count: usize,
    },

    /// Static locator resolved with an index, or an indexed one without
    #[error("Locator {name} {}", arity_hint(.indexed))]
    LocatorArity {
        /// Locator name
        name: String,
        /// Whether the locator is indexed
        indexed: bool,
    },

    /// A wait condition was not met in time
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// Description of the condition
        waited_for: String,
    },

    /// Rendered order differs from the expected order
    #[error("Order mismatch at index {index}: expected {expected:?}, observed {observed:?}")]
    OrderMismatch {
        /// First differing position (0-based)
        index: usize,
        /// Expected value at that position
        expected: Option<String>,
        /// Observed value at that position
        observed: Option<String>,
    },

    /// Element absent from the page
    #[error("No such element: {selector}")]
    NoSuchElement {
        /// Selector that matched nothing
        selector: String,
    },

    /// Element present but hidden or covered
    #[error("Element not interactable: {selector}")]
    ElementNotInteractable {
        /// Selector of the element
        selector: String,
    },

    /// Scenario assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Price text could not be parsed
    #[error("Invalid price {text:?}: {message}")]
    InvalidPrice {
        /// Raw price text
        text: String,
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Browser session error (lost connection, quit failed)
    #[error("Browser session error: {message}")]
    SessionError {
        /// Error message
        message: String,
    },

    /// DevTools call failed without taking the session down, e.g. a page
    /// script running while the page navigates away
    #[error("DevTools error: {message}")]
    Cdp {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    ScreenshotError {
        /// Error message
        message: String,
    },

    /// Window handle bookkeeping error
    #[error("Window error: {message}")]
    WindowError {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

fn arity_hint(indexed: &bool) -> &'static str {
    if *indexed {
        "requires an index"
    } else {
        "does not take an index"
    }
}

impl SwagError {
    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a no-such-element error
    #[must_use]
    pub fn no_such_element(selector: impl Into<String>) -> Self {
        Self::NoSuchElement {
            selector: selector.into(),
        }
    }

    /// Create a session error
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::SessionError {
            message: message.into(),
        }
    }

    /// Create a DevTools error
    #[must_use]
    pub fn cdp(message: impl Into<String>) -> Self {
        Self::Cdp {
            message: message.into(),
        }
    }

    /// Element-not-found is the one error that doubles as an "absent" signal
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NoSuchElement { .. })
    }

    /// Errors that a later poll may not see again
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Cdp { .. })
    }

    /// Errors that end the whole run rather than a single scenario
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::BrowserLaunchError { .. } | Self::SessionError { .. }
        )
    }
}
