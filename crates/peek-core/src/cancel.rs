//! Cooperative cancellation.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Advisory cancellation flag shared between the caller and the resolver.
///
/// Checked between candidate files and before every node visit. A parse of a
/// single file is never interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone of this token observes it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
