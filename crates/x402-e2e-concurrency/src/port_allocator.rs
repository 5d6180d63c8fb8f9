//! Monotonic port allocator (spec.md §4.5). Ports are never reused, even
//! after the process that held one exits; callers accumulate combos/
//! facilitators before execution starts and do not recycle.

use parking_lot::Mutex;

const STARTING_PORT: u16 = 4022;

/// Ports the underlying fetch layer refuses to connect to regardless of
/// what's listening (spec.md §3, §4.5).
const UNSAFE_PORTS: &[u16] = &[4045];

pub struct PortAllocator {
    next: Mutex<u16>,
}

impl Default for PortAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl PortAllocator {
    pub fn new() -> Self {
        Self {
            next: Mutex::new(STARTING_PORT),
        }
    }

    /// Returns the next unique, non-unsafe port. Strictly increasing across
    /// calls on the same allocator.
    pub fn next_port(&self) -> u16 {
        let mut next = self.next.lock();
        loop {
            let candidate = *next;
            *next = next.checked_add(1).expect("port counter overflowed u16");
            if !UNSAFE_PORTS.contains(&candidate) {
                return candidate;
            }
            // Unsafe port: silently skip (spec.md §7 error taxonomy).
        }
    }

    /// Allocates `n` ports in one call, useful for "one per facilitator,
    /// one per combo" batch allocation (spec.md §4.13 step 7).
    pub fn next_n_ports(&self, n: usize) -> Vec<u16> {
        (0..n).map(|_| self.next_port()).collect()
    }
}
