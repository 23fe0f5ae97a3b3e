//! Plugsmith Configuration System
//!
//! Resolves the toolchain settings a build runs with: which compiler to
//! invoke, extra compile/link flags, the C++ standard and runtime library,
//! and the system include prefix.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config (~/.plugsmith/config.toml)
//! 3. Environment variables (CC, CFLAGS, LDFLAGS, CXXSTD, CXXLIB, PLUGSMITH_*)
//! 4. CLI flags (applied by the caller)
//!
//! # Example
//!
//! ```no_run
//! use plugsmith_config::ConfigLoader;
//!
//! let mut loader = ConfigLoader::new();
//! let toolchain = loader.load().unwrap();
//! println!("compiler: {}", toolchain.compiler);
//! ```

pub mod global;
pub mod loader;
pub mod toolchain;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use global::{GlobalConfig, ToolchainOverrides};
pub use loader::ConfigLoader;
pub use toolchain::{split_flags, ToolchainConfig, DEFAULT_MAX_EXTRA_FLAGS};
