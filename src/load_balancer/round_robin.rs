//! Round-robin cursor.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared counter that picks the starting point of each selection scan.
///
/// Every draw increments the counter once; concurrent callers each get their
/// own draw, but fairness across callers is best-effort.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the counter and return the new value modulo `len`.
    ///
    /// A fresh cursor's first draw is index 1. Returns 0 for `len == 0`.
    pub fn next_index(&self, len: usize) -> usize {
        let next = self.counter.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        next.checked_rem(len).unwrap_or(0)
    }

    /// Move the cursor to `index` so the next draw starts just past it.
    pub fn advance_to(&self, index: usize) {
        self.counter.store(index, Ordering::Release);
    }

    /// Raw counter value.
    pub fn current(&self) -> usize {
        self.counter.load(Ordering::Acquire)
    }
}
