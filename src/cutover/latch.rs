//! One-shot activation flag for a cutover.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Monotonic boolean marking a cutover as completed.
///
/// Starts false; once [`set`](Latch::set) it never reverts. The store runs
/// inside the same critical section as the backlog snapshot, so observing
/// `true` implies the snapshot content is already fixed.
#[derive(Clone, Default)]
pub(crate) struct Latch(Arc<AtomicBool>);

impl Latch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub(crate) fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_starts_unset_and_is_monotonic() {
        let latch = Latch::new();
        assert!(!latch.is_set());

        latch.set();
        assert!(latch.is_set());
        latch.set();
        assert!(latch.is_set(), "repeated set must stay true");
    }

    #[test]
    fn test_latch_clones_share_state() {
        let latch = Latch::new();
        let other = latch.clone();
        latch.set();
        assert!(other.is_set());
    }
}
