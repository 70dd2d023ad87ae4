//! ## lifetrace-cli
//! **Command-line entry point for the lifecycle harness**
//!
//! Runs the configured scenarios against a fresh harness and, once all
//! process-scope storage has unwound, prints the allocate and deallocate
//! counters.

use clap::Parser;

mod commands;
mod error;

use commands::Cli;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    commands::run_command(cli)
}
