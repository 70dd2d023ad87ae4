//! # Lifetrace Telemetry
//!
//! Logging and metrics for the lifecycle harness. Both are lifecycle
//! observers, so they can be fanned out next to each other on one ledger.

pub mod logging;
pub mod metrics;

pub use logging::{EventLogger, LoggingObserver};
pub use metrics::MetricsRecorder;
