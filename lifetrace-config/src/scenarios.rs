//! Scenario selection.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Which harness scenarios run, and how many times.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
pub struct ScenarioConfig {
    /// Exercise every ownership strategy.
    #[serde(default = "default_true")]
    pub allocation: bool,

    /// Exercise the move/copy policy chain.
    #[serde(default = "default_true")]
    pub relocation: bool,

    /// Repetitions of each enabled scenario. Static storage is still built
    /// only once.
    #[serde(default = "default_iterations")]
    #[validate(range(min = 1, max = 1000))]
    pub iterations: u32,
}

fn default_true() -> bool {
    true
}

fn default_iterations() -> u32 {
    1
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            allocation: default_true(),
            relocation: default_true(),
            iterations: default_iterations(),
        }
    }
}
