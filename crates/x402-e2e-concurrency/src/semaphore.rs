//! Counting semaphore for combo-level concurrency (spec.md §4.8).
//!
//! Waiters are served FIFO. `acquire()` is the only suspension point; it
//! resolves immediately if a permit is free, otherwise the caller is
//! enqueued and woken by the next `release()`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

struct State {
    available: usize,
    waiters: VecDeque<oneshot::Sender<()>>,
}

/// A counting semaphore with `N` permits.
pub struct Semaphore {
    state: Mutex<State>,
}

impl Semaphore {
    pub fn new(permits: usize) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                available: permits,
                waiters: VecDeque::new(),
            }),
        })
    }

    /// Number of permits immediately available (does not count waiters).
    pub fn available_permits(&self) -> usize {
        self.state.lock().available
    }

    /// Acquires one permit, suspending the caller if none are free. Returns
    /// an RAII [`SemaphorePermit`] whose release (manual or on drop) wakes
    /// exactly one FIFO-next waiter, if any.
    pub async fn acquire(self: &Arc<Self>) -> SemaphorePermit {
        let rx = {
            let mut state = self.state.lock();
            if state.available > 0 {
                state.available -= 1;
                None
            } else {
                let (tx, rx) = oneshot::channel();
                state.waiters.push_back(tx);
                Some(rx)
            }
        };

        if let Some(rx) = rx {
            // Suspended here until release() hands us a permit directly.
            let _ = rx.await;
        }

        SemaphorePermit {
            semaphore: Arc::clone(self),
            released: AtomicBool::new(false),
        }
    }
}

/// RAII permit. Releasing is idempotent: a manual `release()` followed by
/// `drop` (or two manual releases via `Arc` aliasing) never double-counts.
pub struct SemaphorePermit {
    semaphore: Arc<Semaphore>,
    released: AtomicBool,
}

impl SemaphorePermit {
    /// Releases the permit now instead of waiting for `Drop`.
    pub fn release(self) {
        self.do_release();
    }

    fn do_release(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut state = self.semaphore.state.lock();
        if let Some(waiter) = state.waiters.pop_front() {
            // Hand the permit straight to the next waiter; `available`
            // stays unchanged since it's being transferred, not freed.
            let _ = waiter.send(());
        } else {
            state.available += 1;
        }
    }
}

impl Drop for SemaphorePermit {
    fn drop(&mut self) {
        self.do_release();
    }
}
