//! View lifetime tracking.
//!
//! A [`ViewScope`] is created when a screen mounts and closed when it
//! unmounts. Loaders check it before applying results, so a response that
//! lands after the screen is gone is dropped instead of mutating dead state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cancellation token tied to one view's lifetime.
///
/// Clones share the same flag.
#[derive(Debug, Clone)]
pub struct ViewScope {
    closed: Arc<AtomicBool>,
}

impl ViewScope {
    #[must_use]
    pub fn new() -> Self {
        Self {
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Mark the view as gone. Idempotent.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Whether results should still be applied.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_is_shared_between_clones() {
        let scope = ViewScope::new();
        let handle = scope.clone();
        assert!(handle.is_active());

        scope.close();
        assert!(!handle.is_active());
        scope.close();
        assert!(!scope.is_active());
    }
}
