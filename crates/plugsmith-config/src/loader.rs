//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::global::GlobalConfig;
use crate::toolchain::ToolchainConfig;
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Built-in defaults - lowest priority
/// 2. Global config (~/.plugsmith/config.toml) - overrides defaults
/// 3. Environment variables - overrides global
/// 4. CLI flags - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Use a specific global config file instead of ~/.plugsmith/config.toml
    pub fn with_global_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Resolve the toolchain against the process environment
    pub fn load(&mut self) -> ConfigResult<ToolchainConfig> {
        self.load_with_env(|key| env::var(key).ok())
    }

    /// Resolve the toolchain using a custom environment lookup
    pub fn load_with_env<F>(&mut self, lookup: F) -> ConfigResult<ToolchainConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ToolchainConfig::default();

        let global = self.load_global_config()?;
        global.apply_to(&mut config);

        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Load global configuration
    ///
    /// A missing file (or a missing home directory) yields the default
    /// configuration; a file that exists but fails to parse is an error.
    fn load_global_config(&mut self) -> ConfigResult<GlobalConfig> {
        if self.global_config_path.is_none() {
            match GlobalConfig::global_config_path() {
                Ok(path) => self.global_config_path = Some(path),
                Err(ConfigError::HomeNotFound) => return Ok(GlobalConfig::default()),
                Err(e) => return Err(e),
            }
        }

        let Some(path) = self.global_config_path.as_deref() else {
            return Ok(GlobalConfig::default());
        };

        load_optional(path)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn load_optional(path: &Path) -> ConfigResult<GlobalConfig> {
    match GlobalConfig::load_from_file(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::NotFound(_)) => Ok(GlobalConfig::default()),
        Err(e) => Err(e),
    }
}
