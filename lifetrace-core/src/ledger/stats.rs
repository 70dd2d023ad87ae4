//! ## lifetrace-core::ledger::stats
//! **Lifecycle counters**
//!
//! Counts construction and destruction events of instrumented resources, plus
//! the byte-level events of the hooked heap allocation path. The two sets are
//! kept apart: hook events never move the allocate/deallocate pair.

use std::cell::Cell;
use std::fmt;

/// Process-wide counter pair plus raw allocation statistics.
///
/// Uses `Cell` since the harness is single-threaded and the ledger that owns
/// these counters is shared through `Rc`.
#[derive(Debug, Default)]
pub struct LifecycleCounters {
    allocate: Cell<u64>,
    deallocate: Cell<u64>,
    raw_allocations: Cell<u64>,
    raw_releases: Cell<u64>,
    raw_bytes: Cell<u64>,
}

impl LifecycleCounters {
    /// Creates a new counter set with every counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the count of constructed resources.
    #[inline]
    pub fn increment_allocate(&self) {
        self.allocate.set(self.allocate.get() + 1);
    }

    /// Increments the count of destroyed resources.
    #[inline]
    pub fn increment_deallocate(&self) {
        self.deallocate.set(self.deallocate.get() + 1);
    }

    /// Records one hooked heap allocation of `bytes` bytes.
    #[inline]
    pub fn record_raw_allocation(&self, bytes: usize) {
        self.raw_allocations.set(self.raw_allocations.get() + 1);
        self.raw_bytes.set(self.raw_bytes.get() + bytes as u64);
    }

    /// Records one hooked heap release.
    #[inline]
    pub fn record_raw_release(&self) {
        self.raw_releases.set(self.raw_releases.get() + 1);
    }

    pub fn allocate(&self) -> u64 {
        self.allocate.get()
    }

    pub fn deallocate(&self) -> u64 {
        self.deallocate.get()
    }

    pub fn raw_allocations(&self) -> u64 {
        self.raw_allocations.get()
    }

    pub fn raw_releases(&self) -> u64 {
        self.raw_releases.get()
    }

    /// Total bytes requested through the hooked allocation path.
    pub fn raw_bytes(&self) -> u64 {
        self.raw_bytes.get()
    }

    /// Captures the allocate/deallocate pair at this instant.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            allocated: self.allocate(),
            deallocated: self.deallocate(),
        }
    }
}

/// The two integers reported at teardown.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub allocated: u64,
    pub deallocated: u64,
}

impl CounterSnapshot {
    /// True when every constructed resource has been destroyed exactly once.
    pub fn is_balanced(&self) -> bool {
        self.allocated == self.deallocated
    }

    /// Resources constructed but not yet destroyed.
    ///
    /// Negative only after a double destruction.
    pub fn live(&self) -> i64 {
        self.allocated as i64 - self.deallocated as i64
    }

    /// Counter movement between an earlier snapshot and this one.
    pub fn since(&self, earlier: &CounterSnapshot) -> CounterSnapshot {
        CounterSnapshot {
            allocated: self.allocated - earlier.allocated,
            deallocated: self.deallocated - earlier.deallocated,
        }
    }
}

impl fmt::Display for CounterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Allocate counter: {}", self.allocated)?;
        write!(f, "Deallocate counter: {}", self.deallocated)
    }
}
