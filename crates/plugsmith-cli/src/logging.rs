//! Log output for the CLI
//!
//! Library events (`compiling ...`, warnings about skipped files) go to
//! stderr so stdout stays free for results and JSON. `RUST_LOG` is honored
//! unless `-v` or `-q` is given.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Requested amount of log output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if verbose {
            Self::Verbose
        } else if quiet {
            Self::Quiet
        } else {
            Self::Normal
        }
    }

    /// Filter directive for this verbosity, if it overrides `RUST_LOG`
    fn directive(&self) -> Option<&'static str> {
        match self {
            Self::Quiet => Some("warn"),
            Self::Normal => None,
            Self::Verbose => Some("debug"),
        }
    }
}

fn env_filter(verbosity: Verbosity) -> EnvFilter {
    match verbosity.directive() {
        Some(directive) => EnvFilter::new(directive),
        // Defaults to INFO if RUST_LOG is not set
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

/// Install the global subscriber
///
/// Safe to call more than once; later calls are ignored.
pub fn init(verbosity: Verbosity) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .compact()
        .try_init();
}
