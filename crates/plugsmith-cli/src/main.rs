use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod config;
mod logging;

/// Incremental builder for plugin shared libraries.
///
/// Compiles the C and C++ sources under src/, embeds the files under
/// assets/ and links everything into <app>.so. Only units whose object is
/// out of date are recompiled.
///
/// EXAMPLES:
///     plugsmith build               Build the project in the current directory
///     plugsmith build shop --json   Build ./shop and print a JSON summary
///     plugsmith clean               Remove objects and the built library
///     plugsmith run                 Build, then start the host runtime
///
/// ENVIRONMENT VARIABLES:
///     CC, CFLAGS, LDFLAGS   Compiler and extra compile/link flags
///     CXXSTD, CXXLIB        C++ standard and runtime library
///     PLUGSMITH_PREFIX      Install prefix for system headers (default /usr/local)
///     PLUGSMITH_MAX_FLAGS   Cap on extra CFLAGS/LDFLAGS entries (0 = unlimited)
///     PLUGSMITH_RUNTIME     Host runtime started by 'run' (default kore)
///     RUST_LOG              Log filter (default info)
#[derive(Parser)]
#[command(name = "plugsmith")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbose output (debug logs)
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet output (warnings and errors only)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a plugin project
    ///
    /// Embeds assets, recompiles stale units and relinks the shared library
    /// when anything changed.
    ///
    /// EXAMPLES:
    ///     plugsmith build                  Build the current directory
    ///     plugsmith build shop --cc clang  Build ./shop with clang
    ///     plugsmith build --json           Print counts and timings as JSON
    #[command(visible_alias = "b")]
    Build {
        /// Project directory
        dir: Option<PathBuf>,
        /// Compiler to use (overrides CC and the config file)
        #[arg(long)]
        cc: Option<String>,
        /// JSON output
        #[arg(long, env = "PLUGSMITH_JSON")]
        json: bool,
    },

    /// Remove build products
    ///
    /// Deletes .objs/ and <app>.so.
    Clean {
        /// Project directory
        dir: Option<PathBuf>,
    },

    /// Build, then run the project with the host runtime
    ///
    /// Replaces this process with `<runtime> -fnrc conf/<app>.conf`,
    /// started inside the project directory.
    #[command(visible_alias = "r")]
    Run {
        /// Project directory
        dir: Option<PathBuf>,
        /// Compiler to use (overrides CC and the config file)
        #[arg(long)]
        cc: Option<String>,
    },

    /// Generate shell completions
    ///
    /// EXAMPLES:
    ///     plugsmith completions bash > ~/.bash_completions/plugsmith.bash
    ///     plugsmith completions zsh > ~/.zfunc/_plugsmith
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Commands {
    /// Name used to prefix fatal errors
    fn name(&self) -> &'static str {
        match self {
            Self::Build { .. } => "build",
            Self::Clean { .. } => "clean",
            Self::Run { .. } => "run",
            Self::Completions { .. } => "completions",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(logging::Verbosity::from_flags(cli.verbose, cli.quiet));

    let name = cli.command.name();
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("plugsmith {}: {:#}", name, e);
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Build { dir, cc, json } => {
            let args = commands::build::BuildArgs {
                project_dir: dir,
                compiler: cc,
                quiet: cli.quiet,
                json,
            };
            commands::build::run(args)?;
        }
        Commands::Clean { dir } => {
            commands::clean::run(dir)?;
        }
        Commands::Run { dir, cc } => {
            let args = commands::build::BuildArgs {
                project_dir: dir,
                compiler: cc,
                ..Default::default()
            };
            commands::run::run(args)?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
        }
    }

    Ok(())
}
