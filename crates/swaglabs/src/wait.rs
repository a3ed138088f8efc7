//! Polling waits with a bounded timeout.
//!
//! Each wait probes the driver, sleeps for the poll interval, and gives up
//! with [`SwagError::Timeout`] once the timeout has elapsed. The probe always
//! runs at least once, so a zero timeout is a single check.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::driver::{ElementHandle, SessionDriver, WindowHandle};
use crate::locator::Selector;
use crate::result::{SwagError, SwagResult};

/// Default timeout for wait operations (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Result of a successful wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
}

struct Deadline {
    start: Instant,
    options: WaitOptions,
    waited_for: String,
}

impl Deadline {
    fn start(options: WaitOptions, waited_for: String) -> Self {
        Self {
            start: Instant::now(),
            options,
            waited_for,
        }
    }

    fn done(self) -> WaitResult {
        let elapsed = self.start.elapsed();
        debug!(waited_for = %self.waited_for, elapsed_ms = elapsed.as_millis() as u64, "wait satisfied");
        WaitResult {
            elapsed,
            waited_for: self.waited_for,
        }
    }

    /// Sleep one interval, or fail if the timeout has passed
    async fn tick(&self) -> SwagResult<()> {
        if self.start.elapsed() >= self.options.timeout() {
            return Err(SwagError::Timeout {
                ms: self.options.timeout_ms,
                waited_for: self.waited_for.clone(),
            });
        }
        tokio::time::sleep(self.options.poll_interval()).await;
        Ok(())
    }
}

/// Wait until an element is present in the DOM
pub async fn wait_for_element<D>(
    driver: &D,
    selector: &Selector,
    options: WaitOptions,
) -> SwagResult<(ElementHandle, WaitResult)>
where
    D: SessionDriver + ?Sized,
{
    let deadline = Deadline::start(options, format!("element {selector}"));
    loop {
        match driver.find_element(selector).await {
            Ok(handle) => return Ok((handle, deadline.done())),
            Err(e) if e.is_not_found() || e.is_transient() => deadline.tick().await?,
            Err(e) => return Err(e),
        }
    }
}

/// Wait until an element is present and visible
pub async fn wait_for_visible<D>(
    driver: &D,
    selector: &Selector,
    options: WaitOptions,
) -> SwagResult<WaitResult>
where
    D: SessionDriver + ?Sized,
{
    let deadline = Deadline::start(options, format!("visible {selector}"));
    loop {
        match driver.is_displayed(selector).await {
            Ok(true) => return Ok(deadline.done()),
            Ok(false) => deadline.tick().await?,
            Err(e) if e.is_not_found() || e.is_transient() => deadline.tick().await?,
            Err(e) => return Err(e),
        }
    }
}

/// Wait until `document.readyState` is `"complete"`
pub async fn wait_for_page_ready<D>(driver: &D, options: WaitOptions) -> SwagResult<WaitResult>
where
    D: SessionDriver + ?Sized,
{
    let deadline = Deadline::start(options, "document ready".to_string());
    loop {
        match driver.ready_state().await {
            Ok(state) if state == "complete" => return Ok(deadline.done()),
            Ok(_) => {}
            Err(e) if e.is_transient() => debug!(error = %e, "ready state unavailable"),
            Err(e) => return Err(e),
        }
        deadline.tick().await?;
    }
}

/// Wait until the current URL satisfies `predicate`
pub async fn wait_for_url<D, P>(
    driver: &D,
    description: &str,
    predicate: P,
    options: WaitOptions,
) -> SwagResult<WaitResult>
where
    D: SessionDriver + ?Sized,
    P: Fn(&str) -> bool + Send + Sync,
{
    let deadline = Deadline::start(options, format!("url {description}"));
    loop {
        match driver.current_url().await {
            Ok(url) if predicate(&url) => return Ok(deadline.done()),
            Ok(_) => {}
            Err(e) if e.is_transient() => debug!(error = %e, "url unavailable"),
            Err(e) => return Err(e),
        }
        deadline.tick().await?;
    }
}

/// Wait until a window not listed in `known` appears
pub async fn wait_for_new_window<D>(
    driver: &D,
    known: &[WindowHandle],
    options: WaitOptions,
) -> SwagResult<(WindowHandle, WaitResult)>
where
    D: SessionDriver + ?Sized,
{
    let deadline = Deadline::start(options, "new window".to_string());
    loop {
        let open = driver.window_handles().await?;
        if let Some(handle) = open.into_iter().find(|h| !known.contains(h)) {
            return Ok((handle, deadline.done()));
        }
        deadline.tick().await?;
    }
}
