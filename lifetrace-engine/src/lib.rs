//! # Lifetrace Engine
//!
//! Owns the process-scope storage of a harness run and drives the scenarios
//! that exercise every ownership strategy and the relocation policy chain.

pub mod engine;
pub mod runtime;
pub mod scenarios;

// Re-export the runtime functions so frontends can simply do:
pub use engine::{EngineError, Harness};
pub use runtime::{
    pool_settings, run_allocation_mode, run_relocation_mode, run_scenarios, telemetry_observer,
    ScenarioReport,
};
