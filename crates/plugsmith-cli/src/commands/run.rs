//! Run command - build, then hand the process over to the host runtime

use super::build::{self, BuildArgs, OutputMode};
use anyhow::{Context, Result};
use plugsmith_build::BuildContext;
use std::process::Command;

/// Run the run command
///
/// On success this does not return: the process image is replaced by
/// `<runtime> -fnrc conf/<app>.conf` started inside the project root.
pub fn run(args: BuildArgs) -> Result<()> {
    let mut builder = build::prepare(&args)?;
    let outcome = builder.build()?;
    build::report(&outcome, OutputMode::Normal)?;

    let mut command = runtime_command(builder.context());
    let runtime = builder.context().toolchain().runtime.clone();
    exec(&mut command).with_context(|| format!("couldn't start {}", runtime))
}

/// Command line for the host runtime
pub fn runtime_command(ctx: &BuildContext) -> Command {
    let mut command = Command::new(&ctx.toolchain().runtime);
    command
        .arg("-fnrc")
        .arg(ctx.relative_conf_path())
        .current_dir(ctx.root());
    command
}

#[cfg(unix)]
fn exec(command: &mut Command) -> std::io::Result<()> {
    use std::os::unix::process::CommandExt;
    // exec only returns on failure
    Err(command.exec())
}

#[cfg(not(unix))]
fn exec(command: &mut Command) -> std::io::Result<()> {
    let status = command.status()?;
    std::process::exit(status.code().unwrap_or(1));
}
