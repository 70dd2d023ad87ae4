//! ## lifetrace-core::ledger
//! **Counter pair and observer shared by every resource**
//!
//! A [`Ledger`] replaces the usual pair of process globals. It is created once,
//! shared as `Rc<Ledger>`, and each resource keeps the handle it was built
//! against so destruction can be counted from `Drop`.
//!
//! ### Key Submodules:
//! - `stats/`: the allocate/deallocate counters and raw hook statistics
//! - `observer/`: lifecycle events and the observers that receive them

use std::rc::Rc;

pub mod observer;
pub mod stats;

pub use observer::{
    Construction, Fanout, LifecycleEvent, LifecycleObserver, NullObserver, RecordingObserver,
};
pub use stats::{CounterSnapshot, LifecycleCounters};

/// Counters plus the observer that every lifecycle event is reported to.
pub struct Ledger {
    counters: LifecycleCounters,
    observer: Rc<dyn LifecycleObserver>,
}

impl Ledger {
    /// Creates a ledger reporting to `observer`, with counters at zero.
    pub fn new(observer: Rc<dyn LifecycleObserver>) -> Rc<Self> {
        Rc::new(Self {
            counters: LifecycleCounters::new(),
            observer,
        })
    }

    /// A ledger whose events go nowhere. Counters still run.
    pub fn silent() -> Rc<Self> {
        Self::new(Rc::new(NullObserver))
    }

    pub fn counters(&self) -> &LifecycleCounters {
        &self.counters
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    pub(crate) fn constructed(&self, via: Construction, tag: &str, value: i32) {
        self.counters.increment_allocate();
        self.observer.observe(&LifecycleEvent::Constructed {
            tag: tag.to_owned(),
            value,
            via,
        });
    }

    pub(crate) fn destroyed(&self, tag: &str, value: i32) {
        self.counters.increment_deallocate();
        self.observer.observe(&LifecycleEvent::Destroyed {
            tag: tag.to_owned(),
            value,
        });
    }

    /// Reports a delegating constructor that forwarded to the direct one.
    /// Not counted; the target constructor already was.
    pub(crate) fn delegated(&self, tag: &str, value: i32) {
        self.observer.observe(&LifecycleEvent::Constructed {
            tag: tag.to_owned(),
            value,
            via: Construction::Delegated,
        });
    }

    pub(crate) fn raw_allocated(&self, bytes: usize, address: usize) {
        self.counters.record_raw_allocation(bytes);
        self.observer
            .observe(&LifecycleEvent::RawAllocated { bytes, address });
    }

    pub(crate) fn raw_released(&self, address: usize) {
        self.counters.record_raw_release();
        self.observer.observe(&LifecycleEvent::RawReleased { address });
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}
