//! ## lifetrace-core::ownership
//! **Catalog of ownership strategies**
//!
//! A strategy is not stored anywhere; it classifies how a resource's address
//! is reached and how it is released. The engine runs one demonstration per
//! strategy and uses this catalog for span names and tags.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Process lifetime, built on first use, destroyed at harness teardown.
    Static,
    /// Process lifetime, built when the harness starts.
    Global,
    /// Scope lifetime, destroyed in reverse declaration order.
    Stack,
    /// Allocate, construct, destruct and deallocate as four separate calls.
    RawHeap,
    /// Allocated through the resource's own allocation hooks.
    HookedHeap,
    /// Single owner; transferring the owner leaves the source empty.
    Exclusive,
    /// Reference counted, with weak observers that may fail to upgrade.
    Shared,
    /// Slot taken from a fixed-block pool and returned to it.
    Pool,
}

impl Strategy {
    pub const ALL: [Strategy; 8] = [
        Strategy::Static,
        Strategy::Global,
        Strategy::Stack,
        Strategy::RawHeap,
        Strategy::HookedHeap,
        Strategy::Exclusive,
        Strategy::Shared,
        Strategy::Pool,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Static => "static",
            Strategy::Global => "global",
            Strategy::Stack => "stack",
            Strategy::RawHeap => "raw-heap",
            Strategy::HookedHeap => "hooked-heap",
            Strategy::Exclusive => "exclusive",
            Strategy::Shared => "shared",
            Strategy::Pool => "pool",
        }
    }

    /// Tag given to resources built under this strategy.
    ///
    /// Every heap-backed strategy shares the `heap` tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Strategy::Static => "static",
            Strategy::Global => "global",
            Strategy::Stack => "stack",
            Strategy::RawHeap | Strategy::HookedHeap | Strategy::Exclusive | Strategy::Shared => {
                "heap"
            }
            Strategy::Pool => "pool",
        }
    }

    /// Whether the per-object memory comes from the global heap.
    pub fn uses_global_heap(&self) -> bool {
        matches!(
            self,
            Strategy::RawHeap | Strategy::HookedHeap | Strategy::Exclusive | Strategy::Shared
        )
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = Strategy::ALL.iter().map(Strategy::name).collect();
        assert_eq!(names.len(), Strategy::ALL.len());
    }

    #[test]
    fn pool_and_scoped_storage_avoid_global_heap() {
        assert!(!Strategy::Pool.uses_global_heap());
        assert!(!Strategy::Stack.uses_global_heap());
        assert!(Strategy::Shared.uses_global_heap());
        assert_eq!(Strategy::Exclusive.tag(), "heap");
    }
}
