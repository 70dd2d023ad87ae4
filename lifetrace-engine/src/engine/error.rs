use lifetrace_config::ConfigError;
use lifetrace_core::HarnessError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Allocation failure: {0}")]
    Harness(#[from] HarnessError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Counters unbalanced at teardown: {allocated} allocated, {deallocated} deallocated")]
    Unbalanced { allocated: u64, deallocated: u64 },
}
