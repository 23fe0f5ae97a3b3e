//! Toolchain settings consumed by the compiler and linker drivers

use crate::{ConfigError, ConfigResult};
use std::path::PathBuf;

/// Default cap on user-supplied extra compile or link flags
pub const DEFAULT_MAX_EXTRA_FLAGS: usize = 10;

/// Environment variable naming the compiler
pub const ENV_COMPILER: &str = "CC";
/// Environment variable holding extra compile flags
pub const ENV_CFLAGS: &str = "CFLAGS";
/// Environment variable holding extra link flags
pub const ENV_LDFLAGS: &str = "LDFLAGS";
/// Environment variable selecting the C++ standard (`-std=...`)
pub const ENV_CXX_STD: &str = "CXXSTD";
/// Environment variable naming the C++ runtime library (`-l...`)
pub const ENV_CXX_LIB: &str = "CXXLIB";
/// Environment variable for the system include prefix
pub const ENV_PREFIX: &str = "PLUGSMITH_PREFIX";
/// Environment variable for the extra-flag cap (0 = unlimited)
pub const ENV_MAX_FLAGS: &str = "PLUGSMITH_MAX_FLAGS";
/// Environment variable naming the host runtime used by `run`
pub const ENV_RUNTIME: &str = "PLUGSMITH_RUNTIME";

/// Fully resolved toolchain configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainConfig {
    /// Compiler executable, also used as the linker driver
    pub compiler: String,
    /// Extra compile flags (user supplied)
    pub cflags: Vec<String>,
    /// Extra link flags (user supplied)
    pub ldflags: Vec<String>,
    /// C++ standard passed as `-std=<value>` to C++ units
    pub cxx_std: Option<String>,
    /// C++ runtime library linked when any C++ unit exists
    pub cxx_lib: String,
    /// Installation prefix; `<prefix>/include` is added to the include path
    pub prefix: PathBuf,
    /// Maximum number of extra flags kept from `cflags`/`ldflags` (0 = unlimited)
    pub max_extra_flags: usize,
    /// Host runtime program started by `plugsmith run`
    pub runtime: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler: "cc".to_string(),
            cflags: Vec::new(),
            ldflags: Vec::new(),
            cxx_std: None,
            cxx_lib: "stdc++".to_string(),
            prefix: PathBuf::from("/usr/local"),
            max_extra_flags: DEFAULT_MAX_EXTRA_FLAGS,
            runtime: "kore".to_string(),
        }
    }
}

impl ToolchainConfig {
    /// System include directory derived from the prefix
    pub fn include_dir(&self) -> PathBuf {
        self.prefix.join("include")
    }

    /// Set the compiler
    pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
        self.compiler = compiler.into();
        self
    }

    /// Apply environment overrides using the given lookup function
    ///
    /// Empty values are treated as unset. The lookup is injected so callers
    /// can resolve against something other than the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(cc) = get(ENV_COMPILER) {
            self.compiler = cc.trim().to_string();
        }
        if let Some(flags) = get(ENV_CFLAGS) {
            self.cflags = split_flags(&flags);
        }
        if let Some(flags) = get(ENV_LDFLAGS) {
            self.ldflags = split_flags(&flags);
        }
        if let Some(std) = get(ENV_CXX_STD) {
            self.cxx_std = Some(std.trim().to_string());
        }
        if let Some(lib) = get(ENV_CXX_LIB) {
            self.cxx_lib = lib.trim().to_string();
        }
        if let Some(prefix) = get(ENV_PREFIX) {
            self.prefix = PathBuf::from(prefix.trim());
        }
        if let Some(max) = get(ENV_MAX_FLAGS) {
            self.max_extra_flags = parse_max_flags(ENV_MAX_FLAGS, &max)?;
        }
        if let Some(runtime) = get(ENV_RUNTIME) {
            self.runtime = runtime.trim().to_string();
        }

        Ok(())
    }
}

/// Split a flag string on whitespace
pub fn split_flags(flags: &str) -> Vec<String> {
    flags.split_whitespace().map(str::to_string).collect()
}

fn parse_max_flags(field: &str, value: &str) -> ConfigResult<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|e| ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected a non-negative integer, got '{}' ({})", value, e),
        })
}
