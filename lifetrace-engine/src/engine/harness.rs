//! Process-scope storage and teardown sequencing.
//!
//! A `Harness` stands in for the lifetime of a whole program run. It owns the
//! storage that outlives every scenario (the lazily built static resource and
//! the global resource built at start-up) and the callbacks that read the
//! counters once all of that storage has unwound.

use std::rc::Rc;

use lifetrace_core::ledger::{CounterSnapshot, Ledger, LifecycleObserver};
use lifetrace_core::ownership::Strategy;
use lifetrace_core::Resource;
use once_cell::unsync::OnceCell;
use tracing::{debug, info};

const GLOBAL_VALUE: i32 = 123;
const STATIC_VALUE: i32 = 1;

type TeardownHook = Box<dyn FnOnce(CounterSnapshot)>;

pub struct Harness {
    ledger: Rc<Ledger>,
    static_storage: OnceCell<Resource>,
    global: Option<Resource>,
    teardown: Vec<TeardownHook>,
}

impl Harness {
    /// Starts a run: creates the ledger and builds the global resource.
    pub fn new(observer: Rc<dyn LifecycleObserver>) -> Self {
        let ledger = Ledger::new(observer);
        let global = Resource::new(&ledger, GLOBAL_VALUE, Strategy::Global.tag());
        debug!(strategy = %Strategy::Global, "global storage initialised");
        Self {
            ledger,
            static_storage: OnceCell::new(),
            global: Some(global),
            teardown: Vec::new(),
        }
    }

    pub fn ledger(&self) -> &Rc<Ledger> {
        &self.ledger
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        self.ledger.snapshot()
    }

    /// The static resource, built on first use and kept until teardown.
    pub fn static_resource(&self) -> &Resource {
        self.static_storage.get_or_init(|| {
            debug!(strategy = %Strategy::Static, "static storage initialised on first use");
            Resource::new(&self.ledger, STATIC_VALUE, Strategy::Static.tag())
        })
    }

    pub fn static_initialised(&self) -> bool {
        self.static_storage.get().is_some()
    }

    pub fn global_resource(&self) -> Option<&Resource> {
        self.global.as_ref()
    }

    /// Registers a callback that receives the final counters after every
    /// process-scope resource has been destroyed. Callbacks run in
    /// registration order.
    pub fn on_teardown(&mut self, hook: impl FnOnce(CounterSnapshot) + 'static) {
        self.teardown.push(Box::new(hook));
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        // Static storage first, then global, then the counter readers.
        drop(self.static_storage.take());
        drop(self.global.take());

        let snapshot = self.ledger.snapshot();
        info!(
            allocated = snapshot.allocated,
            deallocated = snapshot.deallocated,
            "harness teardown complete"
        );
        for hook in self.teardown.drain(..) {
            hook(snapshot);
        }
    }
}
