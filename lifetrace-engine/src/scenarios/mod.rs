//! The two harness scenarios.
//!
//! - `allocation`: one resource per ownership strategy, released explicitly or
//!   by scope exit
//! - `relocation`: relocates each type of the policy chain once

pub mod allocation;
pub mod relocation;

pub use allocation::{run_allocation_scenario, AllocationOutcome};
pub use relocation::{run_relocation_scenario, RelocationOutcome, RelocationStep};
