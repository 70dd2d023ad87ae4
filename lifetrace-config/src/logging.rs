//! Logging configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is not set.
    #[serde(default = "default_level")]
    #[validate(custom(function = validation::validate_log_level))]
    pub level: String,

    /// Emit span enter/exit events (one span per scenario and strategy).
    #[serde(default)]
    pub span_events: bool,
}

fn default_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            span_events: false,
        }
    }
}
