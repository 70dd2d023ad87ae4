//! # lifetrace-core
//!
//! Instrumented resource type and the allocation strategies it is exercised under.
//! Every construction, copy, move and destruction of a [`Resource`] is counted
//! against a shared [`Ledger`] and reported to its observer.
//!
//! ### Key Submodules:
//! - `ledger`: counter pair, lifecycle events and observers
//! - `resource`: the instrumented value type and its hooked heap box
//! - `alloc`: fixed-block slot pool and the four-step raw heap block
//! - `ownership`: catalog of the ways a resource's lifetime is bound to storage
//! - `relocation`: move/copy policy resolver over a small derivation chain
//!
//! Everything here is single-threaded. Ledger handles are `Rc`, so none of the
//! types cross thread boundaries.

pub mod alloc;
pub mod error;
pub mod ledger;
pub mod ownership;
pub mod relocation;
pub mod resource;

pub mod prelude {
    pub use crate::alloc::pool::{PoolSettings, SlotId, SlotPool};
    pub use crate::alloc::raw::RawBlock;
    pub use crate::error::*;
    pub use crate::ledger::*;
    pub use crate::ownership::Strategy;
    pub use crate::relocation::*;
    pub use crate::resource::*;
}

pub use error::HarnessError;
pub use ledger::{CounterSnapshot, Ledger};
pub use resource::Resource;
