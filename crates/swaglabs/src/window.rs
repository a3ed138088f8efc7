//! Window bookkeeping for outbound tabs.
//!
//! The bottom of the stack is the window the suites started in. Opening a
//! tab pushes it; leaving a tab pops it, and the new top is the window to
//! switch back to.

use crate::driver::WindowHandle;
use crate::result::{SwagError, SwagResult};

/// Stack of open windows, primary at the bottom
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowStack {
    handles: Vec<WindowHandle>,
}

impl WindowStack {
    /// Stack holding only the primary window
    #[must_use]
    pub fn new(primary: WindowHandle) -> Self {
        Self {
            handles: vec![primary],
        }
    }

    /// Whether the primary window has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Number of tracked windows, primary included
    #[must_use]
    pub fn depth(&self) -> usize {
        self.handles.len()
    }

    /// The primary window
    #[must_use]
    pub fn primary(&self) -> Option<&WindowHandle> {
        self.handles.first()
    }

    /// The most recently opened window
    #[must_use]
    pub fn top(&self) -> Option<&WindowHandle> {
        self.handles.last()
    }

    /// Record a newly opened window
    pub fn push(&mut self, handle: WindowHandle) -> SwagResult<()> {
        if self.handles.contains(&handle) {
            return Err(SwagError::WindowError {
                message: format!("window {handle} is already tracked"),
            });
        }
        self.handles.push(handle);
        Ok(())
    }

    /// Forget the top window; returns it with the window to return to.
    /// The primary window is never popped.
    pub fn pop(&mut self) -> SwagResult<(WindowHandle, WindowHandle)> {
        if self.handles.len() < 2 {
            return Err(SwagError::WindowError {
                message: "no secondary window is open".to_string(),
            });
        }
        let closed = self.handles.pop().ok_or_else(|| SwagError::WindowError {
            message: "window stack is empty".to_string(),
        })?;
        let parent = self.handles.last().cloned().ok_or_else(|| SwagError::WindowError {
            message: "window stack lost its primary".to_string(),
        })?;
        Ok((closed, parent))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn h(id: &str) -> WindowHandle {
        WindowHandle::new(id)
    }

    #[test]
    fn test_push_pop() {
        let mut stack = WindowStack::new(h("main"));
        stack.push(h("tab-1")).unwrap();
        stack.push(h("tab-2")).unwrap();
        assert_eq!(stack.depth(), 3);

        assert_eq!(stack.pop().unwrap(), (h("tab-2"), h("tab-1")));
        assert_eq!(stack.pop().unwrap(), (h("tab-1"), h("main")));
        assert_eq!(stack.top(), Some(&h("main")));
    }

    #[test]
    fn test_primary_never_popped() {
        let mut stack = WindowStack::new(h("main"));
        assert!(matches!(stack.pop(), Err(SwagError::WindowError { .. })));
        assert_eq!(stack.primary(), Some(&h("main")));

        let mut empty = WindowStack::default();
        assert!(empty.is_empty());
        assert!(empty.pop().is_err());
    }

    #[test]
    fn test_duplicate_push_rejected() {
        let mut stack = WindowStack::new(h("main"));
        assert!(stack.push(h("main")).is_err());
    }
}
