//! Per-invocation build context
//!
//! Everything a build needs to know about the project and toolchain lives in
//! one [`BuildContext`] value. It is constructed once per invocation and passed
//! to every stage, so independent builds never share state.

use crate::error::{BuildError, BuildResult};
use plugsmith_config::ToolchainConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the generated asset header, inside `src/`
pub const ASSET_HEADER: &str = "assets.h";
/// Build cache directory, relative to the project root
pub const OBJECT_DIR: &str = ".objs";

/// Project layout and toolchain for a single build
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Application name (also the shared library and config file stem)
    app_name: String,
    /// Project root directory
    root: PathBuf,
    /// Resolved toolchain
    toolchain: ToolchainConfig,
}

impl BuildContext {
    /// Create a context for the project at `root`
    ///
    /// The application name is the last component of `root`. Fails unless
    /// `root/src` is a directory and `root/conf/<app>.conf` is a file.
    pub fn new(root: impl Into<PathBuf>, toolchain: ToolchainConfig) -> BuildResult<Self> {
        let root = root.into();
        let app_name = app_name_for(&root)?;
        Self::with_app_name(root, app_name, toolchain)
    }

    /// Create a context with an explicit application name
    pub fn with_app_name(
        root: impl Into<PathBuf>,
        app_name: impl Into<String>,
        toolchain: ToolchainConfig,
    ) -> BuildResult<Self> {
        let context = Self {
            app_name: app_name.into(),
            root: root.into(),
            toolchain,
        };
        context.validate()?;
        Ok(context)
    }

    fn validate(&self) -> BuildResult<()> {
        if self.src_dir().is_dir() && self.conf_path().is_file() {
            return Ok(());
        }
        Err(BuildError::InvalidProject {
            app: self.app_name.clone(),
            root: self.root.clone(),
        })
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn toolchain(&self) -> &ToolchainConfig {
        &self.toolchain
    }

    pub fn src_dir(&self) -> PathBuf {
        self.root.join("src")
    }

    /// Project-private header directory
    pub fn includes_dir(&self) -> PathBuf {
        self.src_dir().join("includes")
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join("assets")
    }

    pub fn objs_dir(&self) -> PathBuf {
        self.root.join(OBJECT_DIR)
    }

    /// `conf/<app>.conf`, relative to the project root
    pub fn relative_conf_path(&self) -> PathBuf {
        Path::new("conf").join(format!("{}.conf", self.app_name))
    }

    pub fn conf_path(&self) -> PathBuf {
        self.root.join(self.relative_conf_path())
    }

    pub fn asset_header_path(&self) -> PathBuf {
        self.src_dir().join(ASSET_HEADER)
    }

    /// The shared library this build produces
    pub fn output_path(&self) -> PathBuf {
        self.root.join(format!("{}.so", self.app_name))
    }

    /// Object file for a compilation unit
    pub fn object_path(&self, logical_name: &str) -> PathBuf {
        self.objs_dir().join(format!("{}.o", logical_name))
    }

    /// Generated C source for an embedded asset
    pub fn generated_source_path(&self, logical_name: &str) -> PathBuf {
        self.objs_dir().join(format!("{}.c", logical_name))
    }
}

/// Derive the application name from a project directory
///
/// Paths without a usable final component (`.`, `..`, `/`) are resolved
/// through the filesystem first.
pub fn app_name_for(root: &Path) -> BuildResult<String> {
    if let Some(name) = root.file_name() {
        return Ok(name.to_string_lossy().into_owned());
    }

    let resolved = fs::canonicalize(root).map_err(|e| BuildError::io(root, e))?;
    resolved
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| BuildError::UnnamedProject(root.to_path_buf()))
}
