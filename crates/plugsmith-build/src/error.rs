/// Build system error types
use std::path::PathBuf;
use thiserror::Error;

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{app} doesn't appear to be a plugsmith app (expected {root}/src and {root}/conf/{app}.conf)")]
    InvalidProject { app: String, root: PathBuf },

    #[error("Cannot determine application name for {0}")]
    UnnamedProject(PathBuf),

    #[error("Failed to open directory {path}: {error}")]
    DirectoryOpen {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("stat({path}): {error}")]
    Stat {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("Couldn't find extension in asset '{name}'")]
    MissingExtension { name: String },

    #[error("Asset {path} is {size} bytes, larger than the 4 GiB an asset length can describe")]
    AssetTooLarge { path: PathBuf, size: u64 },

    #[error("Compilation unit '{name}' is produced by more than one file (second: {path})")]
    DuplicateUnit { name: String, path: PathBuf },

    #[error("Failed to start {program}: {error}")]
    Spawn {
        program: String,
        error: std::io::Error,
    },

    #[error("Subprocess trouble during {step} ({status}), check output")]
    SubprocessFailed { step: String, status: String },

    #[error("I/O error at {path}: {error}")]
    IoError {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            error,
        }
    }

    /// Create a stat error
    pub fn stat(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::Stat {
            path: path.into(),
            error,
        }
    }

    /// Create a directory open error
    pub fn directory_open(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::DirectoryOpen {
            path: path.into(),
            error,
        }
    }

    /// Create a missing extension error
    pub fn missing_extension(name: impl Into<String>) -> Self {
        Self::MissingExtension { name: name.into() }
    }

    /// Create a subprocess failure error
    pub fn subprocess(step: impl Into<String>, status: impl ToString) -> Self {
        Self::SubprocessFailed {
            step: step.into(),
            status: status.to_string(),
        }
    }
}
