//! Toolchain resolution for CLI commands
//!
//! Layers command-line overrides on top of what `plugsmith-config` resolves
//! from the global config file and the environment.

use anyhow::{Context, Result};
use plugsmith_config::{ConfigLoader, ToolchainConfig};

/// Overrides given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// `--cc`
    pub compiler: Option<String>,
}

impl CliOverrides {
    /// Apply the overrides to a resolved toolchain
    pub fn apply(&self, mut toolchain: ToolchainConfig) -> ToolchainConfig {
        if let Some(compiler) = self.compiler.as_deref().filter(|c| !c.trim().is_empty()) {
            toolchain = toolchain.with_compiler(compiler.trim());
        }
        toolchain
    }
}

/// Resolve the toolchain: defaults, global config, environment, then flags
pub fn resolve_toolchain(overrides: &CliOverrides) -> Result<ToolchainConfig> {
    let toolchain = ConfigLoader::new()
        .load()
        .context("failed to load configuration")?;
    Ok(overrides.apply(toolchain))
}
