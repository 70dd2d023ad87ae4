//! ## lifetrace-core::resource
//! **The instrumented value type**
//!
//! Every construction path of [`Resource`] (direct, delegating default, copy,
//! move) counts exactly once against the ledger, and every destruction counts
//! exactly once from `Drop`. A move is a full construction event here: the
//! destination is a new resource, the source stays alive in an emptied state
//! and is destroyed (and counted) on its own.
//!
//! Rust moves are bitwise and invisible, so the observable move is the
//! explicit [`Resource::take`]. Plain Rust moves of a `Resource` between
//! bindings or into a container never touch the counters.

use std::rc::Rc;

use crate::ledger::{Construction, Ledger};

pub mod hooked;

pub use hooked::ResourceBox;

/// Value the default constructor forwards with.
pub const DEFAULT_VALUE: i32 = 99;
/// Tag the default constructor forwards with.
pub const DEFAULT_TAG: &str = "default";

/// One tracked allocation: a value, a tag naming where it was made, and the
/// ledger it reports to.
pub struct Resource {
    value: i32,
    tag: String,
    ledger: Rc<Ledger>,
}

impl Resource {
    /// Direct construction. Counts one allocation and reports `(tag, value)`.
    pub fn new(ledger: &Rc<Ledger>, value: i32, tag: impl Into<String>) -> Self {
        let resource = Self {
            value,
            tag: tag.into(),
            ledger: Rc::clone(ledger),
        };
        ledger.constructed(Construction::Direct, &resource.tag, resource.value);
        resource
    }

    /// Default construction, forwarding to [`Resource::new`] with
    /// `(99, "default")`. The forwarded call is the only one that counts.
    pub fn with_default(ledger: &Rc<Ledger>) -> Self {
        let resource = Self::new(ledger, DEFAULT_VALUE, DEFAULT_TAG);
        ledger.delegated(&resource.tag, resource.value);
        resource
    }

    /// Move construction: relocates the tag out of `self` into a new resource.
    ///
    /// The integer is copied, as a member-wise move of a plain integer would.
    /// `self` keeps its value, loses its tag, and remains safe to drop.
    pub fn take(&mut self) -> Self {
        let moved = Self {
            value: self.value,
            tag: std::mem::take(&mut self.tag),
            ledger: Rc::clone(&self.ledger),
        };
        self.ledger
            .constructed(Construction::Moved, &moved.tag, moved.value);
        moved
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// True once the tag has been relocated away by [`Resource::take`].
    pub fn is_emptied(&self) -> bool {
        self.tag.is_empty()
    }

    pub fn ledger(&self) -> &Rc<Ledger> {
        &self.ledger
    }

    /// Identity of this resource: its current address.
    ///
    /// Stable for as long as the resource is not moved by Rust, which every
    /// storage strategy in this crate guarantees for its lifetime.
    pub fn address(&self) -> usize {
        self as *const Self as usize
    }
}

impl AsRef<Resource> for Resource {
    fn as_ref(&self) -> &Resource {
        self
    }
}

/// Copy construction. `source` is left untouched.
impl Clone for Resource {
    fn clone(&self) -> Self {
        let copy = Self {
            value: self.value,
            tag: self.tag.clone(),
            ledger: Rc::clone(&self.ledger),
        };
        self.ledger
            .constructed(Construction::Copied, &copy.tag, copy.value);
        copy
    }
}

impl Drop for Resource {
    fn drop(&mut self) {
        self.ledger.destroyed(&self.tag, self.value);
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("value", &self.value)
            .field("tag", &self.tag)
            .finish()
    }
}

/// Takes a resource by value and hands it back through the type's move.
///
/// The parameter is the moved-from source: it is destroyed, emptied, when the
/// function returns.
pub fn pass_by_value(mut resource: Resource) -> Resource {
    resource.take()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{LifecycleEvent, RecordingObserver};

    fn recorded() -> (Rc<Ledger>, Rc<RecordingObserver>) {
        let recorder = Rc::new(RecordingObserver::new());
        (Ledger::new(recorder.clone()), recorder)
    }

    #[test]
    fn direct_construction_counts_once() {
        let (ledger, recorder) = recorded();
        {
            let resource = Resource::new(&ledger, 2, "stack");
            assert_eq!(resource.value(), 2);
            assert_eq!(resource.tag(), "stack");
            assert_eq!(ledger.snapshot().allocated, 1);
            assert_eq!(ledger.snapshot().deallocated, 0);
        }
        assert!(ledger.snapshot().is_balanced());
        assert_eq!(
            recorder.events().last(),
            Some(&LifecycleEvent::Destroyed {
                tag: "stack".into(),
                value: 2
            })
        );
    }

    #[test]
    fn default_construction_delegates_without_double_count() {
        let (ledger, recorder) = recorded();
        let resource = Resource::with_default(&ledger);

        assert_eq!(resource.value(), 99);
        assert_eq!(resource.tag(), "default");
        assert_eq!(ledger.snapshot().allocated, 1);
        assert_eq!(recorder.count("construct"), 1);
        assert_eq!(recorder.count("construct_delegated"), 1);
    }

    #[test]
    fn copy_leaves_source_unchanged() {
        let (ledger, recorder) = recorded();
        let source = Resource::new(&ledger, 7, "copy-me");
        let copy = source.clone();

        assert_eq!(source.tag(), "copy-me");
        assert_eq!(copy.tag(), "copy-me");
        assert_eq!(copy.value(), 7);
        assert_eq!(ledger.snapshot().allocated, 2);
        assert_eq!(recorder.count("copy"), 1);
    }

    #[test]
    fn move_empties_source_tag_and_counts_as_construction() {
        let (ledger, recorder) = recorded();
        {
            let mut source = Resource::new(&ledger, 5, "origin");
            let moved = source.take();

            assert_eq!(moved.tag(), "origin");
            assert_eq!(moved.value(), 5);
            assert!(source.is_emptied());
            assert_eq!(source.value(), 5);
            assert_eq!(ledger.snapshot().allocated, 2);
        }
        assert_eq!(ledger.snapshot().deallocated, 2);

        // The emptied source reports its post-move state when destroyed.
        let destroyed: Vec<_> = recorder
            .events()
            .into_iter()
            .filter(|e| e.kind() == "destroy")
            .collect();
        assert!(destroyed.contains(&LifecycleEvent::Destroyed {
            tag: String::new(),
            value: 5
        }));
        assert!(destroyed.contains(&LifecycleEvent::Destroyed {
            tag: "origin".into(),
            value: 5
        }));
    }

    #[test]
    fn pass_by_value_moves_out_of_parameter() {
        let (ledger, recorder) = recorded();
        let result = pass_by_value(Resource::with_default(&ledger));

        assert_eq!(result.tag(), "default");
        // Constructed once, moved once, parameter already destroyed.
        assert_eq!(ledger.snapshot().allocated, 2);
        assert_eq!(ledger.snapshot().deallocated, 1);
        assert_eq!(recorder.events_tagged("").len(), 1);
    }

    #[test]
    fn rust_moves_are_not_counted() {
        let ledger = Ledger::silent();
        let resource = Resource::new(&ledger, 1, "plain");
        let mut holder = Vec::with_capacity(1);
        holder.push(resource);
        let back = holder.pop();

        assert!(back.is_some());
        assert_eq!(ledger.snapshot().allocated, 1);
        drop(back);
        assert!(ledger.snapshot().is_balanced());
    }
}
