/*!
# Runtime

Entry points shared by every frontend: build the observer stack, run the
configured scenarios against a harness, and collect what they observed.
*/

use std::rc::Rc;

use lifetrace_config::{HarnessConfig, PoolConfig};
use lifetrace_core::alloc::pool::PoolSettings;
use lifetrace_core::ledger::{Fanout, LifecycleObserver};
use lifetrace_telemetry::{LoggingObserver, MetricsRecorder};
use tracing::{info, instrument};

use crate::engine::{EngineError, Harness};
use crate::scenarios::{
    run_allocation_scenario, run_relocation_scenario, AllocationOutcome, RelocationOutcome,
};

/// Outcomes of every scenario run, in execution order.
#[derive(Debug, Default)]
pub struct ScenarioReport {
    pub allocation: Vec<AllocationOutcome>,
    pub relocation: Vec<RelocationOutcome>,
}

pub fn pool_settings(config: &PoolConfig) -> PoolSettings {
    PoolSettings {
        chunk_slots: config.chunk_slots,
        max_chunks: config.max_chunks,
    }
}

/// Logging observer, plus the metrics recorder when one is given.
pub fn telemetry_observer(metrics: Option<Rc<MetricsRecorder>>) -> Rc<dyn LifecycleObserver> {
    let mut fanout = Fanout::new().with(Rc::new(LoggingObserver));
    if let Some(metrics) = metrics {
        fanout.push(metrics);
    }
    Rc::new(fanout)
}

/// Runs every scenario enabled in `config`, `iterations` times each.
#[instrument(level = "info", name = "run_scenarios", skip_all, fields(iterations = config.scenarios.iterations))]
pub fn run_scenarios(harness: &Harness, config: &HarnessConfig) -> Result<ScenarioReport, EngineError> {
    let mut report = ScenarioReport::default();
    let settings = pool_settings(&config.pool);

    for iteration in 0..config.scenarios.iterations {
        if config.scenarios.allocation {
            report
                .allocation
                .push(run_allocation_scenario(harness, settings)?);
        }
        if config.scenarios.relocation {
            report.relocation.push(run_relocation_scenario(harness));
        }
        info!(iteration, counters = ?harness.snapshot(), "iteration complete");
    }
    Ok(report)
}

/// Runs the allocation scenario once.
pub fn run_allocation_mode(
    harness: &Harness,
    config: &PoolConfig,
) -> Result<AllocationOutcome, EngineError> {
    Ok(run_allocation_scenario(harness, pool_settings(config))?)
}

/// Runs the relocation scenario once.
pub fn run_relocation_mode(harness: &Harness) -> RelocationOutcome {
    run_relocation_scenario(harness)
}
