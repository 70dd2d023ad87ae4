//! Slot pool configuration.
//!
//! Controls how the fixed-block pool grows when its free-list runs dry.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Slot pool growth parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Slots added per backing chunk.
    #[serde(default = "default_chunk_slots")]
    #[validate(range(min = 1, max = 65536))]
    pub chunk_slots: usize,

    /// Maximum number of chunks; unset means grow until the system allocator
    /// refuses.
    #[serde(default)]
    #[validate(range(min = 1))]
    pub max_chunks: Option<usize>,
}

fn default_chunk_slots() -> usize {
    32
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            chunk_slots: default_chunk_slots(),
            max_chunks: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_chunk_limit_is_rejected() {
        let config = PoolConfig {
            chunk_slots: 4,
            max_chunks: Some(0),
        };
        assert!(config.validate().is_err());
    }
}
