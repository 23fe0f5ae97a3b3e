//! Global Configuration (~/.plugsmith/config.toml)
//!
//! Handles user-level configuration stored in `~/.plugsmith/config.toml`.

use crate::toolchain::ToolchainConfig;
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global user configuration from ~/.plugsmith/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Toolchain settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolchain: Option<ToolchainOverrides>,
}

/// Toolchain settings from the `[toolchain]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ToolchainOverrides {
    /// Compiler executable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,

    /// Extra compile flags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cflags: Option<Vec<String>>,

    /// Extra link flags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ldflags: Option<Vec<String>>,

    /// C++ standard (e.g. "c++17")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cxx_std: Option<String>,

    /// C++ runtime library name (e.g. "c++")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cxx_lib: Option<String>,

    /// Installation prefix for system headers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<PathBuf>,

    /// Cap on extra flags (0 = unlimited)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_extra_flags: Option<usize>,

    /// Host runtime program
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
}

impl GlobalConfig {
    /// Load global configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the global configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(toolchain) = &self.toolchain {
            validate_program("toolchain.compiler", toolchain.compiler.as_deref())?;
            validate_program("toolchain.runtime", toolchain.runtime.as_deref())?;
            validate_program("toolchain.cxx_lib", toolchain.cxx_lib.as_deref())?;
        }
        Ok(())
    }

    /// Get the global config file path (~/.plugsmith/config.toml)
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".plugsmith").join("config.toml"))
    }

    /// Apply the settings present in this file onto a toolchain config
    pub fn apply_to(&self, config: &mut ToolchainConfig) {
        let Some(toolchain) = &self.toolchain else {
            return;
        };

        if let Some(compiler) = &toolchain.compiler {
            config.compiler = compiler.clone();
        }
        if let Some(cflags) = &toolchain.cflags {
            config.cflags = cflags.clone();
        }
        if let Some(ldflags) = &toolchain.ldflags {
            config.ldflags = ldflags.clone();
        }
        if let Some(std) = &toolchain.cxx_std {
            config.cxx_std = Some(std.clone());
        }
        if let Some(lib) = &toolchain.cxx_lib {
            config.cxx_lib = lib.clone();
        }
        if let Some(prefix) = &toolchain.prefix {
            config.prefix = prefix.clone();
        }
        if let Some(max) = toolchain.max_extra_flags {
            config.max_extra_flags = max;
        }
        if let Some(runtime) = &toolchain.runtime {
            config.runtime = runtime.clone();
        }
    }
}

fn validate_program(field: &str, value: Option<&str>) -> ConfigResult<()> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: "must not be empty".to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_global_config() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert!(config.toolchain.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_global_config() {
        let toml = r#"
[toolchain]
compiler = "clang"
cflags = ["-O2", "-DNDEBUG"]
ldflags = ["-lm"]
cxx_std = "c++17"
cxx_lib = "c++"
prefix = "/opt/local"
max_extra_flags = 32
runtime = "kore"
"#;

        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());

        let mut resolved = ToolchainConfig::default();
        config.apply_to(&mut resolved);
        assert_eq!(resolved.compiler, "clang");
        assert_eq!(resolved.cflags, vec!["-O2", "-DNDEBUG"]);
        assert_eq!(resolved.ldflags, vec!["-lm"]);
        assert_eq!(resolved.cxx_std.as_deref(), Some("c++17"));
        assert_eq!(resolved.cxx_lib, "c++");
        assert_eq!(resolved.prefix, PathBuf::from("/opt/local"));
        assert_eq!(resolved.max_extra_flags, 32);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml = r#"
[toolchain]
optimise = true
"#;
        assert!(toml::from_str::<GlobalConfig>(toml).is_err());
    }

    #[test]
    fn test_empty_compiler_invalid() {
        let config = GlobalConfig {
            toolchain: Some(ToolchainOverrides {
                compiler: Some("  ".to_string()),
                ..Default::default()
            }),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_overrides_keep_defaults() {
        let config = GlobalConfig {
            toolchain: Some(ToolchainOverrides {
                cxx_std: Some("c++20".to_string()),
                ..Default::default()
            }),
        };

        let mut resolved = ToolchainConfig::default();
        config.apply_to(&mut resolved);
        assert_eq!(resolved.compiler, "cc");
        assert_eq!(resolved.cxx_std.as_deref(), Some("c++20"));
    }
}
