//! ## lifetrace-telemetry::logging
//! **Structured logging with `tracing`**
//!
//! `EventLogger` installs the process-wide subscriber; `LoggingObserver`
//! turns lifecycle events into structured `tracing` events.

use lifetrace_core::ledger::{LifecycleEvent, LifecycleObserver};
use tracing::{debug, info};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the fmt subscriber. `RUST_LOG` takes precedence over `level`.
    ///
    /// Only the first call installs anything; later calls are no-ops.
    pub fn init(level: &str, span_events: bool) {
        let spans = if span_events {
            FmtSpan::ENTER | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
            )
            .with_target(false)
            .with_span_events(spans)
            .try_init();
    }
}

/// Writes every lifecycle event as a structured log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl LifecycleObserver for LoggingObserver {
    fn observe(&self, event: &LifecycleEvent) {
        match event {
            LifecycleEvent::Constructed { tag, value, via } => {
                info!(tag = %tag, value, via = %via, "resource constructed");
            }
            LifecycleEvent::Destroyed { tag, value } => {
                info!(tag = %tag, value, "resource destroyed");
            }
            LifecycleEvent::RawAllocated { bytes, address } => {
                debug!(bytes, address = format_args!("{:#x}", address), "hooked allocation");
            }
            LifecycleEvent::RawReleased { address } => {
                debug!(address = format_args!("{:#x}", address), "hooked release");
            }
        }
    }
}
