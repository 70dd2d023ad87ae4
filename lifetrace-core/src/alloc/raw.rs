//! ## lifetrace-core::alloc::raw
//! **A single heap block driven by hand**
//!
//! [`RawBlock`] exposes the four steps of manual heap management as separate
//! calls: allocate bytes, construct in place, destruct in place, free bytes.
//! It deliberately has no `Drop`; skipping a step leaks or leaves a value
//! undestroyed, which is the caller's mistake to make.

use std::alloc::{self, Layout};
use std::marker::PhantomData;
use std::ptr::NonNull;

use tracing::trace;

use crate::error::HarnessError;

/// Raw, possibly uninitialised heap storage for one `T`.
pub struct RawBlock<T> {
    ptr: NonNull<T>,
    _marker: PhantomData<T>,
}

impl<T> RawBlock<T> {
    /// Step 1: obtains bytes for one `T` from the system allocator.
    /// No constructor runs.
    pub fn allocate() -> Result<Self, HarnessError> {
        let layout = Layout::new::<T>();
        let ptr = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            // SAFETY: the layout has a non-zero size.
            let raw = unsafe { alloc::alloc(layout) }.cast::<T>();
            NonNull::new(raw).ok_or(HarnessError::OutOfMemory {
                bytes: layout.size(),
            })?
        };
        trace!(bytes = layout.size(), address = ptr.as_ptr() as usize, "raw block allocated");
        Ok(Self {
            ptr,
            _marker: PhantomData,
        })
    }

    /// Step 2: constructs `value` in place.
    ///
    /// # Safety
    ///
    /// The block must not currently hold a constructed value.
    pub unsafe fn construct(&mut self, value: T) -> &mut T {
        self.ptr.as_ptr().write(value);
        self.ptr.as_mut()
    }

    /// Reads the constructed value.
    ///
    /// # Safety
    ///
    /// The block must hold a value placed by `construct` and not yet destroyed.
    pub unsafe fn get(&self) -> &T {
        self.ptr.as_ref()
    }

    /// Step 3: runs the destructor in place. The bytes stay allocated.
    ///
    /// # Safety
    ///
    /// The block must hold a value placed by `construct` and not yet destroyed.
    pub unsafe fn destruct(&mut self) {
        std::ptr::drop_in_place(self.ptr.as_ptr());
    }

    /// Step 4: hands the bytes back to the system allocator without running
    /// any destructor.
    pub fn deallocate(self) {
        let layout = Layout::new::<T>();
        if layout.size() != 0 {
            // SAFETY: `ptr` came from `alloc::alloc` with this same layout and
            // `self` is consumed, so it cannot be freed twice.
            unsafe { alloc::dealloc(self.ptr.as_ptr().cast(), layout) };
        }
        trace!(address = self.ptr.as_ptr() as usize, "raw block released");
    }

    pub fn address(&self) -> usize {
        self.ptr.as_ptr() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Ledger, LifecycleEvent, RecordingObserver};
    use crate::resource::Resource;
    use std::rc::Rc;

    #[test]
    fn test_four_step_lifecycle() {
        let recorder = Rc::new(RecordingObserver::new());
        let ledger = Ledger::new(recorder.clone());

        let mut block = RawBlock::<Resource>::allocate().unwrap();
        assert_eq!(ledger.snapshot().allocated, 0);

        let resource = unsafe { block.construct(Resource::new(&ledger, 11, "heap")) };
        assert_eq!(resource.value(), 11);
        assert_eq!(unsafe { block.get() }.value(), 11);

        unsafe { block.destruct() };
        block.deallocate();

        assert_eq!(ledger.snapshot().allocated, 1);
        assert_eq!(ledger.snapshot().deallocated, 1);
        for event in recorder.events_tagged("heap") {
            match event {
                LifecycleEvent::Constructed { value, .. } | LifecycleEvent::Destroyed { value, .. } => {
                    assert_eq!(value, 11)
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        // The raw path does not go through the resource's hooks.
        assert_eq!(recorder.count("raw_alloc"), 0);
    }

    #[test]
    fn test_block_can_be_reused_between_destruct_and_deallocate() {
        let mut block = RawBlock::<String>::allocate().unwrap();
        unsafe {
            block.construct("first".to_string());
            block.destruct();
            block.construct("second".to_string());
            assert_eq!(block.get(), "second");
            block.destruct();
        }
        block.deallocate();
    }

    #[test]
    fn test_zero_sized_block() {
        let mut block = RawBlock::<()>::allocate().unwrap();
        unsafe {
            block.construct(());
            block.destruct();
        }
        block.deallocate();
    }
}
