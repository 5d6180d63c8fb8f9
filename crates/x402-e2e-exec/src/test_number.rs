//! Globally monotonic test numbering (spec.md §4.13, §5): safe to call
//! concurrently from every combo worker.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct TestNumberGenerator {
    next: AtomicU64,
}

impl TestNumberGenerator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Returns the next test number; numbers are never reused or repeated.
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}
