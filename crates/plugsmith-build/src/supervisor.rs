//! Subprocess execution for compile and link steps
//!
//! Children run to completion with the parent's stdio, one at a time.

use crate::driver::Invocation;
use crate::error::{BuildError, BuildResult};
use std::fmt;
use std::io;
use std::process::{Command, ExitStatus};
use std::time::Instant;
use tracing::debug;

/// How a child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessStatus {
    /// Exit code, if the process exited normally
    pub code: Option<i32>,
    /// Terminating signal, if any
    pub signal: Option<i32>,
    /// Whether the process dumped core
    pub core_dumped: bool,
}

impl ProcessStatus {
    /// A normal exit with `code`
    pub fn exited(code: i32) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }

    /// Termination by `signal`
    pub fn signaled(signal: i32, core_dumped: bool) -> Self {
        Self {
            code: None,
            signal: Some(signal),
            core_dumped,
        }
    }

    /// Zero exit, no signal, no core
    pub fn success(&self) -> bool {
        self.code == Some(0) && self.signal.is_none() && !self.core_dumped
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (_, Some(signal)) if self.core_dumped => {
                write!(f, "killed by signal {}, core dumped", signal)
            }
            (_, Some(signal)) => write!(f, "killed by signal {}", signal),
            (Some(code), None) => write!(f, "exit status {}", code),
            (None, None) => write!(f, "unknown status"),
        }
    }
}

impl From<ExitStatus> for ProcessStatus {
    #[cfg(unix)]
    fn from(status: ExitStatus) -> Self {
        use std::os::unix::process::ExitStatusExt;
        Self {
            code: status.code(),
            signal: status.signal(),
            core_dumped: status.core_dumped(),
        }
    }

    #[cfg(not(unix))]
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
            signal: None,
            core_dumped: false,
        }
    }
}

/// Runs an invocation to completion
///
/// The build drives every compiler and linker call through this trait so the
/// process boundary can be replaced in tests.
pub trait CommandRunner {
    /// Run the invocation, blocking until it ends
    ///
    /// `Err` means the program could not be started or waited on.
    fn run(&mut self, invocation: &Invocation) -> io::Result<ProcessStatus>;
}

/// Runs invocations as real child processes with inherited stdio
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> io::Result<ProcessStatus> {
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .status()?;
        Ok(status.into())
    }
}

/// Run one build step and turn anything but a clean exit into an error
pub fn supervise(
    runner: &mut dyn CommandRunner,
    step: &str,
    invocation: &Invocation,
) -> BuildResult<()> {
    debug!(step, command = %invocation, "spawning");
    let start = Instant::now();

    let status = runner.run(invocation).map_err(|error| BuildError::Spawn {
        program: invocation.program_lossy(),
        error,
    })?;

    debug!(step, %status, elapsed_ms = start.elapsed().as_millis() as u64, "finished");

    if status.success() {
        Ok(())
    } else {
        Err(BuildError::subprocess(step, status))
    }
}
