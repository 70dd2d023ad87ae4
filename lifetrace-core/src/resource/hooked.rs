//! ## lifetrace-core::resource::hooked
//! **Heap allocation through the resource's own hooks**
//!
//! [`ResourceBox`] is the type-specific allocation entry point: it requests raw
//! bytes for one [`Resource`] from the system allocator, reports the byte-level
//! event, and only then constructs. Release runs the destructor first and
//! reports the byte-level free afterwards. The hook events are counted apart
//! from the allocate/deallocate pair.

use std::alloc::{self, Layout};
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;
use std::rc::Rc;

use tracing::trace;

use super::Resource;
use crate::error::HarnessError;
use crate::ledger::Ledger;

/// Exclusive owner of a resource allocated through the type's hooks.
pub struct ResourceBox {
    ptr: NonNull<Resource>,
}

impl ResourceBox {
    /// Allocates through the hook and constructs `(value, tag)` in place.
    pub fn new(ledger: &Rc<Ledger>, value: i32, tag: impl Into<String>) -> Result<Self, HarnessError> {
        let layout = Layout::new::<Resource>();
        // SAFETY: `Resource` has a non-zero size.
        let raw = unsafe { alloc::alloc(layout) }.cast::<Resource>();
        let ptr = NonNull::new(raw).ok_or(HarnessError::OutOfMemory {
            bytes: layout.size(),
        })?;
        ledger.raw_allocated(layout.size(), ptr.as_ptr() as usize);
        trace!(bytes = layout.size(), address = ptr.as_ptr() as usize, "hooked allocation");

        // SAFETY: freshly allocated, correctly aligned, uninitialised storage.
        unsafe { ptr.as_ptr().write(Resource::new(ledger, value, tag)) };
        Ok(Self { ptr })
    }

    /// Address handed out by the allocation hook.
    pub fn address(&self) -> usize {
        self.ptr.as_ptr() as usize
    }
}

impl Deref for ResourceBox {
    type Target = Resource;

    fn deref(&self) -> &Resource {
        // SAFETY: the pointee is constructed in `new` and lives until `drop`.
        unsafe { self.ptr.as_ref() }
    }
}

impl DerefMut for ResourceBox {
    fn deref_mut(&mut self) -> &mut Resource {
        // SAFETY: as in `deref`, and `&mut self` guarantees exclusivity.
        unsafe { self.ptr.as_mut() }
    }
}

impl Drop for ResourceBox {
    fn drop(&mut self) {
        let address = self.address();
        let ledger = Rc::clone(self.ledger());
        // SAFETY: the pointee is live and is never touched again after this.
        unsafe {
            std::ptr::drop_in_place(self.ptr.as_ptr());
            alloc::dealloc(self.ptr.as_ptr().cast(), Layout::new::<Resource>());
        }
        ledger.raw_released(address);
        trace!(address, "hooked release");
    }
}

impl std::fmt::Debug for ResourceBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ResourceBox").field(&**self).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{LifecycleEvent, RecordingObserver};

    #[test]
    fn hook_events_bracket_construction() {
        let recorder = Rc::new(RecordingObserver::new());
        let ledger = Ledger::new(recorder.clone());

        let boxed = ResourceBox::new(&ledger, 22, "heap").unwrap();
        let address = boxed.address();
        assert_eq!(boxed.value(), 22);
        assert_eq!(boxed.address(), boxed.deref().address());
        drop(boxed);

        let kinds: Vec<_> = recorder.events().iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, ["raw_alloc", "construct", "destroy", "raw_release"]);
        assert_eq!(
            recorder.events()[0],
            LifecycleEvent::RawAllocated {
                bytes: std::mem::size_of::<Resource>(),
                address
            }
        );
        assert_eq!(
            recorder.events()[3],
            LifecycleEvent::RawReleased { address }
        );
    }

    #[test]
    fn hook_events_do_not_move_lifecycle_counters() {
        let ledger = Ledger::silent();
        let boxed = ResourceBox::new(&ledger, 1, "heap").unwrap();

        assert_eq!(ledger.snapshot().allocated, 1);
        assert_eq!(ledger.counters().raw_allocations(), 1);
        drop(boxed);
        assert!(ledger.snapshot().is_balanced());
        assert_eq!(ledger.counters().raw_releases(), 1);
    }

    #[test]
    fn deref_mut_reaches_the_resource() {
        let ledger = Ledger::silent();
        let mut boxed = ResourceBox::new(&ledger, 3, "heap").unwrap();
        let moved = boxed.take();

        assert!(boxed.is_emptied());
        assert_eq!(moved.tag(), "heap");
    }
}
