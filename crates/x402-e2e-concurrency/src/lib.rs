//! Concurrency primitives: combo-level semaphore, keyed facilitator lock,
//! and the port allocator (spec.md §4.5, §4.8, §4.9).

mod facilitator_lock;
mod port_allocator;
mod semaphore;

pub use facilitator_lock::{evm_key, FacilitatorLock, FacilitatorLockGuard};
pub use port_allocator::PortAllocator;
pub use semaphore::{Semaphore, SemaphorePermit};
