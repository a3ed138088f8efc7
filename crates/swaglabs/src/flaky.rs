//! Test driver that wraps [`MockStorefront`] and fails single calls on cue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::driver::{ElementHandle, SessionDriver, WindowHandle};
use crate::locator::Selector;
use crate::mock::MockStorefront;
use crate::result::{SwagError, SwagResult};

pub(crate) const CONTEXT_DESTROYED: &str = "evaluate: Execution context was destroyed.";

#[derive(Debug, Default)]
pub(crate) struct FlakyDriver {
    inner: MockStorefront,
    lose_context_on: Option<Selector>,
    context_lost: AtomicBool,
    switch_failures: usize,
    counted: Mutex<Vec<Selector>>,
}

impl FlakyDriver {
    pub(crate) fn new(inner: MockStorefront) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// After `selector` is clicked, the next page-side read fails once
    /// the way a page script does when the page navigates under it
    pub(crate) fn lose_context_after_click(mut self, selector: Selector) -> Self {
        self.lose_context_on = Some(selector);
        self
    }

    /// The next `times` window switches fail
    pub(crate) const fn fail_switches(mut self, times: usize) -> Self {
        self.switch_failures = times;
        self
    }

    pub(crate) const fn inner(&self) -> &MockStorefront {
        &self.inner
    }

    pub(crate) fn count_calls(&self, selector: &Selector) -> usize {
        self.counted
            .lock()
            .map(|calls| calls.iter().filter(|s| *s == selector).count())
            .unwrap_or_default()
    }

    fn check_context(&self) -> SwagResult<()> {
        if self.context_lost.swap(false, Ordering::SeqCst) {
            return Err(SwagError::cdp(CONTEXT_DESTROYED));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionDriver for FlakyDriver {
    async fn get(&mut self, url: &str) -> SwagResult<()> {
        self.inner.get(url).await
    }

    async fn find_element(&self, selector: &Selector) -> SwagResult<ElementHandle> {
        self.check_context()?;
        self.inner.find_element(selector).await
    }

    async fn click(&mut self, selector: &Selector) -> SwagResult<()> {
        self.inner.click(selector).await?;
        if self.lose_context_on.as_ref() == Some(selector) {
            self.lose_context_on = None;
            self.context_lost.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn send_keys(&mut self, selector: &Selector, text: &str) -> SwagResult<()> {
        self.inner.send_keys(selector, text).await
    }

    async fn text(&self, selector: &Selector) -> SwagResult<String> {
        self.check_context()?;
        self.inner.text(selector).await
    }

    async fn is_displayed(&self, selector: &Selector) -> SwagResult<bool> {
        self.check_context()?;
        self.inner.is_displayed(selector).await
    }

    async fn count(&self, selector: &Selector) -> SwagResult<usize> {
        self.check_context()?;
        if let Ok(mut calls) = self.counted.lock() {
            calls.push(selector.clone());
        }
        self.inner.count(selector).await
    }

    async fn ready_state(&self) -> SwagResult<String> {
        self.check_context()?;
        self.inner.ready_state().await
    }

    async fn current_url(&self) -> SwagResult<String> {
        self.check_context()?;
        self.inner.current_url().await
    }

    async fn screenshot(&self) -> SwagResult<Vec<u8>> {
        self.inner.screenshot().await
    }

    async fn window_handles(&self) -> SwagResult<Vec<WindowHandle>> {
        self.inner.window_handles().await
    }

    async fn current_window(&self) -> SwagResult<WindowHandle> {
        self.inner.current_window().await
    }

    async fn switch_to_window(&mut self, handle: &WindowHandle) -> SwagResult<()> {
        if self.switch_failures > 0 {
            self.switch_failures -= 1;
            return Err(SwagError::WindowError {
                message: format!("switch to {handle} failed"),
            });
        }
        self.inner.switch_to_window(handle).await
    }

    async fn close_window(&mut self) -> SwagResult<()> {
        self.inner.close_window().await
    }

    async fn back(&mut self) -> SwagResult<()> {
        self.inner.back().await
    }

    async fn forward(&mut self) -> SwagResult<()> {
        self.inner.forward().await
    }

    async fn refresh(&mut self) -> SwagResult<()> {
        self.inner.refresh().await
    }

    async fn quit(&mut self) -> SwagResult<()> {
        self.inner.quit().await
    }
}
