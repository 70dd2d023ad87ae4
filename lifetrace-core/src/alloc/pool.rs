//! ## lifetrace-core::alloc::pool
//! **Fixed-block slot pool**
//!
//! Hands out raw slots sized for one `T` from a free-list and takes them back,
//! without going to the global allocator per object. Backing memory is
//! obtained a whole chunk at a time and stays put until the pool is dropped,
//! so a slot's address is stable.
//!
//! Four independent steps make up a slot's life:
//! 1. [`SlotPool::allocate_slot`]: storage only, no constructor runs
//! 2. [`SlotPool::construct_in_slot`]: placement construction
//! 3. [`SlotPool::destroy_in_slot`]: explicit destruction, slot goes back on the free-list
//! 4. or [`SlotPool::release_slot`] for a slot that was never constructed
use std::mem::{self, MaybeUninit};
use std::ptr;

use tracing::{debug, warn};

use crate::error::HarnessError;

/// Growth parameters of a [`SlotPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    /// Slots per backing chunk.
    pub chunk_slots: usize,
    /// Upper bound on backing chunks; `None` grows until the system refuses.
    pub max_chunks: Option<usize>,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            chunk_slots: 32,
            max_chunks: None,
        }
    }
}

/// Opaque handle to one slot of a [`SlotPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

pub struct SlotPool<T> {
    settings: PoolSettings,
    chunks: Vec<Box<[MaybeUninit<T>]>>,
    free_slots: Vec<SlotId>,
    outstanding: usize,
    // Debug-only liveness bits backing the construct/destroy assertions.
    #[cfg(debug_assertions)]
    live: Vec<bool>,
}

impl<T> SlotPool<T> {
    /// Creates an empty pool. No memory is reserved until the first slot is
    /// requested.
    pub fn new(settings: PoolSettings) -> Self {
        assert!(settings.chunk_slots > 0, "Chunk size must be greater than zero");
        assert!(mem::size_of::<T>() > 0, "Slot type must not be zero-sized");

        Self {
            settings,
            chunks: Vec::new(),
            free_slots: Vec::new(),
            outstanding: 0,
            #[cfg(debug_assertions)]
            live: Vec::new(),
        }
    }

    /// Returns one slot of uninitialised storage, growing by a chunk if the
    /// free-list is empty. Never runs a constructor.
    pub fn allocate_slot(&mut self) -> Result<SlotId, HarnessError> {
        if self.free_slots.is_empty() {
            self.grow()?;
        }
        let slot = self.free_slots.pop().ok_or(HarnessError::OutOfMemory {
            bytes: self.chunk_bytes(),
        })?;
        self.outstanding += 1;
        Ok(slot)
    }

    /// Placement-constructs `value` into `slot`.
    ///
    /// # Safety
    ///
    /// `slot` must come from `allocate_slot` on this pool, must not have been
    /// released since, and must not already hold a constructed value.
    pub unsafe fn construct_in_slot(&mut self, slot: SlotId, value: T) -> &mut T {
        #[cfg(debug_assertions)]
        {
            debug_assert!(!self.live[slot.0], "slot {} is already constructed", slot.0);
            self.live[slot.0] = true;
        }
        let location = self.slot_ptr(slot);
        ptr::write(location, value);
        &mut *location
    }

    /// Runs the destructor of the value in `slot` and returns the slot to the
    /// free-list.
    ///
    /// # Safety
    ///
    /// `slot` must hold a live value placed by `construct_in_slot` that has not
    /// been destroyed yet.
    pub unsafe fn destroy_in_slot(&mut self, slot: SlotId) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.live[slot.0], "slot {} holds no value", slot.0);
            self.live[slot.0] = false;
        }
        ptr::drop_in_place(self.slot_ptr(slot));
        self.free_slots.push(slot);
        self.outstanding -= 1;
    }

    /// Returns a slot to the free-list without running any destructor.
    ///
    /// Meant for slots that were never constructed. Releasing a constructed
    /// slot leaks its value; that is a caller bug, not undefined behaviour.
    pub fn release_slot(&mut self, slot: SlotId) {
        #[cfg(debug_assertions)]
        {
            self.live[slot.0] = false;
        }
        self.free_slots.push(slot);
        self.outstanding -= 1;
    }

    /// Shared access to the value in `slot`.
    ///
    /// # Safety
    ///
    /// `slot` must currently hold a constructed value.
    pub unsafe fn get(&self, slot: SlotId) -> &T {
        let (chunk, offset) = self.locate(slot);
        self.chunks[chunk][offset].assume_init_ref()
    }

    /// Exclusive access to the value in `slot`.
    ///
    /// # Safety
    ///
    /// `slot` must currently hold a constructed value.
    pub unsafe fn get_mut(&mut self, slot: SlotId) -> &mut T {
        &mut *self.slot_ptr(slot)
    }

    /// Address of the storage behind `slot`.
    pub fn slot_address(&self, slot: SlotId) -> usize {
        let (chunk, offset) = self.locate(slot);
        self.chunks[chunk][offset].as_ptr() as usize
    }

    /// Bytes per slot.
    pub fn slot_size(&self) -> usize {
        mem::size_of::<T>()
    }

    /// Slots currently backed by memory, free or not.
    pub fn capacity(&self) -> usize {
        self.chunks.len() * self.settings.chunk_slots
    }

    /// Slots handed out and not yet given back.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn settings(&self) -> &PoolSettings {
        &self.settings
    }

    fn chunk_bytes(&self) -> usize {
        self.settings.chunk_slots.saturating_mul(mem::size_of::<T>())
    }

    #[inline]
    fn locate(&self, slot: SlotId) -> (usize, usize) {
        (
            slot.0 / self.settings.chunk_slots,
            slot.0 % self.settings.chunk_slots,
        )
    }

    #[inline]
    fn slot_ptr(&mut self, slot: SlotId) -> *mut T {
        let (chunk, offset) = self.locate(slot);
        self.chunks[chunk][offset].as_mut_ptr()
    }

    /// Adds one chunk of slots. Every reservation is fallible so that a
    /// refusing system allocator surfaces as `OutOfMemory` instead of an abort.
    fn grow(&mut self) -> Result<(), HarnessError> {
        let slots = self.settings.chunk_slots;
        let out_of_memory = HarnessError::OutOfMemory {
            bytes: self.chunk_bytes(),
        };

        if let Some(limit) = self.settings.max_chunks {
            if self.chunks.len() >= limit {
                warn!(limit, "slot pool reached its chunk limit");
                return Err(out_of_memory);
            }
        }

        let mut chunk: Vec<MaybeUninit<T>> = Vec::new();
        chunk
            .try_reserve_exact(slots)
            .map_err(|_| out_of_memory.clone())?;
        chunk.resize_with(slots, MaybeUninit::uninit);
        self.chunks
            .try_reserve(1)
            .map_err(|_| out_of_memory.clone())?;
        self.free_slots
            .try_reserve(slots)
            .map_err(|_| out_of_memory.clone())?;
        #[cfg(debug_assertions)]
        self.live
            .try_reserve(slots)
            .map_err(|_| out_of_memory.clone())?;

        let first = self.capacity();
        self.chunks.push(chunk.into_boxed_slice());
        // Reversed so the lowest index is handed out first.
        self.free_slots
            .extend((first..first + slots).rev().map(SlotId));
        #[cfg(debug_assertions)]
        self.live.resize(first + slots, false);

        debug!(
            chunk = self.chunks.len(),
            slots,
            slot_size = mem::size_of::<T>(),
            "slot pool grew"
        );
        Ok(())
    }
}

impl<T> Drop for SlotPool<T> {
    fn drop(&mut self) {
        // Chunk memory is freed without running destructors; the pool never
        // knows which slots are constructed.
        if self.outstanding > 0 {
            warn!(
                outstanding = self.outstanding,
                "slot pool dropped with slots still handed out"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct DropCounter(Rc<Cell<usize>>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn settings(chunk_slots: usize) -> PoolSettings {
        PoolSettings {
            chunk_slots,
            max_chunks: None,
        }
    }

    #[test]
    fn test_slot_pool_allocate_construct_destroy() {
        let drops = Rc::new(Cell::new(0));
        let mut pool: SlotPool<DropCounter> = SlotPool::new(settings(4));

        let slot = pool.allocate_slot().unwrap();
        assert_eq!(drops.get(), 0);
        assert_eq!(pool.outstanding(), 1);

        unsafe {
            pool.construct_in_slot(slot, DropCounter(drops.clone()));
            pool.destroy_in_slot(slot);
        }
        assert_eq!(drops.get(), 1);
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn test_allocate_slot_runs_no_constructor_and_release_runs_no_destructor() {
        let mut pool: SlotPool<String> = SlotPool::new(settings(2));
        let slot = pool.allocate_slot().unwrap();
        pool.release_slot(slot);

        assert_eq!(pool.outstanding(), 0);
        // The same slot comes back first.
        assert_eq!(pool.allocate_slot().unwrap(), slot);
    }

    #[test]
    fn test_slot_pool_grows_by_chunks() {
        let mut pool: SlotPool<u64> = SlotPool::new(settings(3));
        assert_eq!(pool.capacity(), 0);

        let slots: Vec<_> = (0..7).map(|_| pool.allocate_slot().unwrap()).collect();
        assert_eq!(pool.chunk_count(), 3);
        assert_eq!(pool.capacity(), 9);
        assert_eq!(pool.outstanding(), 7);

        let mut addresses: Vec<_> = slots.iter().map(|s| pool.slot_address(*s)).collect();
        addresses.sort_unstable();
        addresses.dedup();
        assert_eq!(addresses.len(), 7);
    }

    #[test]
    fn test_slot_addresses_survive_growth() {
        let mut pool: SlotPool<u32> = SlotPool::new(settings(1));
        let first = pool.allocate_slot().unwrap();
        let before = pool.slot_address(first);
        unsafe { pool.construct_in_slot(first, 42) };

        for _ in 0..16 {
            pool.allocate_slot().unwrap();
        }
        assert_eq!(pool.slot_address(first), before);
        assert_eq!(unsafe { *pool.get(first) }, 42);
    }

    #[test]
    fn test_chunk_limit_reports_out_of_memory() {
        let mut pool: SlotPool<u32> = SlotPool::new(PoolSettings {
            chunk_slots: 2,
            max_chunks: Some(1),
        });
        pool.allocate_slot().unwrap();
        pool.allocate_slot().unwrap();

        assert_eq!(
            pool.allocate_slot(),
            Err(HarnessError::OutOfMemory { bytes: 8 })
        );
    }

    #[test]
    #[should_panic]
    fn test_slot_pool_zero_chunk_size() {
        SlotPool::<u32>::new(settings(0));
    }

    proptest! {
        #[test]
        fn prop_balanced_sequences_return_every_slot(
            chunk_slots in 1usize..8,
            ops in proptest::collection::vec(any::<bool>(), 1..64),
        ) {
            let drops = Rc::new(Cell::new(0));
            let mut pool: SlotPool<DropCounter> = SlotPool::new(settings(chunk_slots));
            let mut held = Vec::new();
            let mut constructed = 0;

            for allocate in ops {
                if allocate || held.is_empty() {
                    let slot = pool.allocate_slot().unwrap();
                    unsafe { pool.construct_in_slot(slot, DropCounter(drops.clone())) };
                    constructed += 1;
                    held.push(slot);
                } else if let Some(slot) = held.pop() {
                    unsafe { pool.destroy_in_slot(slot) };
                }
                prop_assert_eq!(pool.outstanding(), held.len());
                prop_assert!(pool.capacity() >= held.len());
            }

            for slot in held.drain(..) {
                unsafe { pool.destroy_in_slot(slot) };
            }
            prop_assert_eq!(drops.get(), constructed);
            prop_assert_eq!(pool.outstanding(), 0);
        }
    }
}
