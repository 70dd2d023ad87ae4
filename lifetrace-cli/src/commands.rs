use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::{Args, Parser, Subcommand};
use lifetrace_config::HarnessConfig;
use lifetrace_core::relocation::policy_table;
use lifetrace_core::CounterSnapshot;
use lifetrace_engine::{
    run_allocation_mode, run_relocation_mode, run_scenarios, telemetry_observer, Harness,
};
use lifetrace_telemetry::{EventLogger, MetricsRecorder};
use tracing::info;

use crate::error::check_balance;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Configuration file; defaults to config/lifetrace.yaml plus environment overrides
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Print Prometheus lifecycle metrics after teardown
    #[arg(long, global = true)]
    pub metrics: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every scenario enabled in the configuration
    Run,
    /// Exercise each ownership strategy once
    Alloc,
    /// Relocate each type of the policy chain once
    Relocate,
    /// Print the move/copy policy resolved for each type
    Policy,
}

pub fn run_command(cli: Cli) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = match &cli.global.config {
        Some(path) => HarnessConfig::load_from_path(path)?,
        None => HarnessConfig::load()?,
    };
    EventLogger::init(&config.logging.level, config.logging.span_events);

    if let Commands::Policy = cli.command {
        for (type_name, policy) in policy_table() {
            println!("{type_name}: {policy:?}");
        }
        return Ok(());
    }

    let metrics = if cli.global.metrics {
        Some(Rc::new(MetricsRecorder::new()?))
    } else {
        None
    };
    let reported = Rc::new(Cell::new(None::<CounterSnapshot>));

    {
        let mut harness = Harness::new(telemetry_observer(metrics.clone()));
        let sink = Rc::clone(&reported);
        harness.on_teardown(move |snapshot| {
            println!("{snapshot}");
            sink.set(Some(snapshot));
        });

        match cli.command {
            Commands::Run => {
                let report = run_scenarios(&harness, &config)?;
                info!(
                    allocation_runs = report.allocation.len(),
                    relocation_runs = report.relocation.len(),
                    "scenarios finished"
                );
            }
            Commands::Alloc => {
                let outcome = run_allocation_mode(&harness, &config.pool)?;
                info!(?outcome, "allocation scenario finished");
            }
            Commands::Relocate => {
                for step in run_relocation_mode(&harness).steps {
                    println!(
                        "{}: {:?}, source tag {:?} -> {:?}",
                        step.type_name, step.policy, step.source_tag_before, step.source_tag_after
                    );
                }
            }
            Commands::Policy => {}
        }
    }

    if let Some(metrics) = metrics {
        print!("{}", metrics.gather_metrics()?);
    }

    match reported.get() {
        Some(snapshot) => Ok(check_balance(snapshot)?),
        None => Ok(()),
    }
}
