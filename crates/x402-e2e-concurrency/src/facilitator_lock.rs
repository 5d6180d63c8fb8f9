//! Per-facilitator keyed mutual exclusion for EVM scenarios (spec.md
//! §4.9): a map of in-flight futures keyed by `"evm:{facilitatorName}"`,
//! guarding against nonce collisions when two concurrent EVM transactions
//! route through the same facilitator.
//!
//! Correctness property (spec.md §4.9): if task A holds a key and task B
//! calls `acquire` for the same key, B does not return until A releases;
//! a subsequent C for the same key observes B's hold. FIFO across waiters
//! is best-effort, not guaranteed.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

struct KeyState {
    held: bool,
    waiters: VecDeque<oneshot::Sender<()>>,
}

/// Builds the lock key for an EVM scenario routed through `facilitator_name`.
pub fn evm_key(facilitator_name: &str) -> String {
    format!("evm:{facilitator_name}")
}

#[derive(Default)]
pub struct FacilitatorLock {
    state: Mutex<HashMap<String, KeyState>>,
}

impl FacilitatorLock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Acquires exclusive hold of `key`, suspending until any prior holder
    /// releases. Returns a guard whose release (manual or on drop) either
    /// hands the hold directly to the next waiter or frees the key.
    pub async fn acquire(self: &Arc<Self>, key: &str) -> FacilitatorLockGuard {
        let rx = {
            let mut map = self.state.lock();
            let entry = map.entry(key.to_string()).or_insert_with(|| KeyState {
                held: false,
                waiters: VecDeque::new(),
            });
            if !entry.held {
                entry.held = true;
                None
            } else {
                let (tx, rx) = oneshot::channel();
                entry.waiters.push_back(tx);
                Some(rx)
            }
        };

        if let Some(rx) = rx {
            let _ = rx.await;
        }

        FacilitatorLockGuard {
            lock: Arc::clone(self),
            key: key.to_string(),
            released: AtomicBool::new(false),
        }
    }
}

pub struct FacilitatorLockGuard {
    lock: Arc<FacilitatorLock>,
    key: String,
    released: AtomicBool,
}

impl FacilitatorLockGuard {
    pub fn release(self) {
        self.do_release();
    }

    fn do_release(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut map = self.lock.state.lock();
        if let Some(entry) = map.get_mut(&self.key) {
            if let Some(waiter) = entry.waiters.pop_front() {
                // Hand the hold directly to the next waiter; `held` stays true.
                let _ = waiter.send(());
            } else {
                map.remove(&self.key);
            }
        }
    }
}

impl Drop for FacilitatorLockGuard {
    fn drop(&mut self) {
        self.do_release();
    }
}
