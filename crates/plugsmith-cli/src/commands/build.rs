//! Build command - compile and link a plugin project

use crate::config::{self, CliOverrides};
use anyhow::Result;
use plugsmith_build::{BuildContext, BuildOutcome, Builder};
use std::path::PathBuf;

/// Build command arguments
#[derive(Debug, Default)]
pub struct BuildArgs {
    /// Project directory (defaults to current directory)
    pub project_dir: Option<PathBuf>,
    /// Compiler override (`--cc`)
    pub compiler: Option<String>,
    /// Quiet output (errors only)
    pub quiet: bool,
    /// JSON output
    pub json: bool,
}

/// How the result is reported on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Normal,
    Quiet,
    Json,
}

/// Run the build command
pub fn run(args: BuildArgs) -> Result<()> {
    let mut builder = prepare(&args)?;
    let outcome = builder.build()?;
    report(&outcome, determine_output_mode(&args))
}

/// Resolve the toolchain and validate the project
pub fn prepare(args: &BuildArgs) -> Result<Builder> {
    let project_dir = args
        .project_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));

    let overrides = CliOverrides {
        compiler: args.compiler.clone(),
    };
    let toolchain = config::resolve_toolchain(&overrides)?;
    let context = BuildContext::new(project_dir, toolchain)?;

    Ok(Builder::new(context))
}

/// Print the build result
pub fn report(outcome: &BuildOutcome, mode: OutputMode) -> Result<()> {
    match mode {
        OutputMode::Json => println!("{}", serde_json::to_string_pretty(outcome)?),
        OutputMode::Quiet => {}
        OutputMode::Normal => println!("{}", summary_line(outcome)),
    }
    Ok(())
}

fn summary_line(outcome: &BuildOutcome) -> String {
    if outcome.is_up_to_date() {
        "nothing to be done".to_string()
    } else {
        format!("{} built successfully!", outcome.app_name)
    }
}

/// Determine output mode from arguments
fn determine_output_mode(args: &BuildArgs) -> OutputMode {
    if args.json {
        OutputMode::Json
    } else if args.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    }
}
