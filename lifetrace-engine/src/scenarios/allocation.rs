//! Allocation scenario: every ownership strategy against one ledger.
//!
//! Builds, in order: two pool resources, the static resource, a stack
//! resource, a raw four-step heap block, a hooked heap box, two shared
//! resources (single and two-allocation forms), an exclusive owner that is
//! transferred, and a weak observer. Pool, raw and hooked storage are then
//! released explicitly; everything else unwinds at scope exit.

use std::rc::Rc;

use lifetrace_core::alloc::pool::{PoolSettings, SlotPool};
use lifetrace_core::alloc::raw::RawBlock;
use lifetrace_core::ownership::Strategy;
use lifetrace_core::resource::ResourceBox;
use lifetrace_core::{CounterSnapshot, HarnessError, Ledger, Resource};
use tracing::{debug, info, instrument};

use crate::engine::Harness;

/// Observations made while the scenario ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationOutcome {
    /// Bytes per pool slot.
    pub pool_slot_size: usize,
    /// Hooked heap events logged while the pool resources lived and died.
    pub pool_hook_events: u64,
    /// Value read back from the raw heap block before destruction.
    pub raw_heap_value: i32,
    /// Owners of the single-allocation shared resource at its peak.
    pub shared_peak_owners: usize,
    /// The shared resource survived until its last owner was released.
    pub shared_destroyed_on_last_release: bool,
    /// A weak observer upgraded while owners were alive.
    pub weak_upgraded_while_owned: bool,
    /// The same observer failed to upgrade once every owner was gone.
    pub weak_empty_after_release: bool,
    /// The exclusive owner was empty after transferring ownership.
    pub exclusive_source_emptied: bool,
    /// Counter movement caused by this scenario alone.
    pub counters: CounterSnapshot,
}

#[instrument(level = "info", name = "allocation_scenario", skip_all)]
pub fn run_allocation_scenario(
    harness: &Harness,
    settings: PoolSettings,
) -> Result<AllocationOutcome, HarnessError> {
    let ledger = harness.ledger();
    let start = ledger.snapshot();

    // Pool: two slots, constructed in place.
    let hooks_before_pool = hook_events(ledger);
    let mut pool: SlotPool<Resource> = SlotPool::new(settings);
    let first_slot = pool.allocate_slot()?;
    let second_slot = pool.allocate_slot()?;
    // SAFETY: both slots are fresh from `allocate_slot` and unconstructed.
    unsafe {
        pool.construct_in_slot(first_slot, Resource::new(ledger, 222, Strategy::Pool.tag()));
        pool.construct_in_slot(second_slot, Resource::new(ledger, 333, Strategy::Pool.tag()));
    }
    let mut pool_hook_events = hook_events(ledger) - hooks_before_pool;
    debug!(strategy = %Strategy::Pool, slot_size = pool.slot_size(), "pool slots constructed");

    // Static: built on first use only.
    let static_value = harness.static_resource().value();
    debug!(strategy = %Strategy::Static, value = static_value, "static storage reached");

    // Stack: destroyed at scope exit, after everything declared below it.
    let stack = Resource::new(ledger, 2, Strategy::Stack.tag());
    debug!(strategy = %Strategy::Stack, value = stack.value(), "stack resource declared");

    // Raw heap: allocate, then construct.
    let mut raw_block = RawBlock::<Resource>::allocate()?;
    // SAFETY: the block was just allocated and holds no value.
    unsafe { raw_block.construct(Resource::new(ledger, 11, Strategy::RawHeap.tag())) };
    // SAFETY: constructed on the line above.
    let raw_heap_value = unsafe { raw_block.get() }.value();
    debug!(strategy = %Strategy::RawHeap, value = raw_heap_value, "raw heap block constructed");

    // Hooked heap: the resource's own allocation entry point.
    let hooked = ResourceBox::new(ledger, 22, Strategy::HookedHeap.tag())?;

    // Shared: value and count in one allocation, then a second handle.
    let shared = Rc::new(Resource::new(ledger, 33, Strategy::Shared.tag()));
    let shared_copy = Rc::clone(&shared);
    // Two allocations: the hooked box and the separate count.
    let shared_boxed = Rc::new(ResourceBox::new(ledger, 333, Strategy::Shared.tag())?);

    // Exclusive: transfer leaves the source empty, the resource stays put.
    let mut exclusive = Some(ResourceBox::new(ledger, 77, Strategy::Exclusive.tag())?);
    let before_transfer = ledger.snapshot();
    let exclusive_owner = exclusive.take();
    let exclusive_source_emptied =
        exclusive.is_none() && exclusive_owner.is_some() && ledger.snapshot() == before_transfer;
    debug!(strategy = %Strategy::Exclusive, exclusive_source_emptied, "exclusive owner transferred");

    let weak = Rc::downgrade(&shared);
    let upgraded = weak.upgrade();
    let weak_upgraded_while_owned = upgraded.is_some();
    let shared_peak_owners = Rc::strong_count(&shared);
    debug!(strategy = %Strategy::Shared, owners = shared_peak_owners, "weak observer upgraded");

    // Explicit pool destruction.
    let hooks_before_pool_release = hook_events(ledger);
    // SAFETY: both slots hold the live resources constructed above.
    unsafe {
        pool.destroy_in_slot(first_slot);
        pool.destroy_in_slot(second_slot);
    }
    pool_hook_events += hook_events(ledger) - hooks_before_pool_release;

    // Explicit raw heap destruction, then release of the bytes.
    // SAFETY: the block holds the resource constructed above.
    unsafe { raw_block.destruct() };
    raw_block.deallocate();

    // Explicit hooked heap release.
    drop(hooked);

    // Release the shared owners one at a time; only the last one destroys.
    let before_release = ledger.snapshot();
    drop(upgraded);
    drop(shared_copy);
    let survived_partial_release = ledger.snapshot() == before_release;
    drop(shared);
    let destroyed_on_last = ledger.snapshot().since(&before_release).deallocated == 1;
    let weak_empty_after_release = weak.upgrade().is_none();

    info!(
        pool_slot_size = pool.slot_size(),
        pool_hook_events,
        weak_upgraded_while_owned,
        weak_empty_after_release,
        "allocation strategies exercised"
    );

    // Reverse declaration order, as scope exit would.
    drop(exclusive_owner);
    drop(shared_boxed);
    drop(stack);

    Ok(AllocationOutcome {
        pool_slot_size: pool.slot_size(),
        pool_hook_events,
        raw_heap_value,
        shared_peak_owners,
        shared_destroyed_on_last_release: survived_partial_release && destroyed_on_last,
        weak_upgraded_while_owned,
        weak_empty_after_release,
        exclusive_source_emptied,
        counters: ledger.snapshot().since(&start),
    })
}

fn hook_events(ledger: &Ledger) -> u64 {
    ledger.counters().raw_allocations() + ledger.counters().raw_releases()
}
