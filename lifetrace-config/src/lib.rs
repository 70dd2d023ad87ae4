//! # Lifetrace Configuration System
//!
//! Layered configuration for the lifecycle harness.
//!
//! ## Features
//! - **Unified Configuration**: pool growth, logging and scenario selection in one place
//! - **Validation**: every loaded configuration is checked before use
//! - **Environment Awareness**: `LIFETRACE_ENV` selects an override file,
//!   `LIFETRACE_*` variables override individual keys

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod error;
mod logging;
mod pool;
mod scenarios;
mod validation;

pub use error::ConfigError;
pub use logging::LoggingConfig;
pub use pool::PoolConfig;
pub use scenarios::ScenarioConfig;

/// Base configuration file, relative to the working directory.
pub const BASE_CONFIG_PATH: &str = "config/lifetrace.yaml";
const ENV_PREFIX: &str = "LIFETRACE_";

/// Top‑level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone, PartialEq)]
pub struct HarnessConfig {
    /// Slot pool growth parameters.
    #[serde(default)]
    #[validate(nested)]
    pub pool: PoolConfig,

    /// Log level and formatting.
    #[serde(default)]
    #[validate(nested)]
    pub logging: LoggingConfig,

    /// Which scenarios run and how often.
    #[serde(default)]
    #[validate(nested)]
    pub scenarios: ScenarioConfig,
}

impl HarnessConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default Values
    /// 2. `config/lifetrace.yaml`, if present
    /// 3. `config/<LIFETRACE_ENV>.yaml`, if `LIFETRACE_ENV` is set and the file exists
    /// 4. `LIFETRACE_*` environment variables, `__` separating nested keys
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(HarnessConfig::default()));

        if Path::new(BASE_CONFIG_PATH).exists() {
            figment = figment.merge(Yaml::file(BASE_CONFIG_PATH));
        }

        if let Ok(env) = std::env::var("LIFETRACE_ENV") {
            let env_file = format!("config/{}.yaml", env);
            if Path::new(&env_file).exists() {
                figment = figment.merge(Yaml::file(env_file));
            }
        }

        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load configuration from a specific file, still honouring environment
    /// overrides.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        Self::extract(
            Figment::from(Serialized::defaults(HarnessConfig::default()))
                .merge(Yaml::file(path))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}
