//! Plugsmith build pipeline
//!
//! Turns a plugin project into a single shared library:
//! - Discovery of C/C++ sources under `src/` and static assets under `assets/`
//! - Asset embedding as generated C sources plus a build-time header
//! - Modification-time based staleness, so only changed units recompile
//! - Compile and link command lines for the configured toolchain
//! - Blocking subprocess supervision behind a replaceable runner
//!
//! Project layout:
//!
//! ```text
//! <app>/
//!   conf/<app>.conf
//!   src/            C and C++ sources, src/includes for private headers
//!   assets/         optional, embedded into the library
//!   .objs/          objects and generated asset sources
//!   <app>.so        build output
//! ```

pub mod assets;
pub mod builder;
pub mod context;
pub mod driver;
pub mod error;
pub mod staleness;
pub mod supervisor;
pub mod unit;
pub mod walker;

// Re-export main types
pub use assets::{AssetHeader, AssetSymbol, EmbedOutcome};
pub use builder::{BuildOutcome, BuildStats, Builder, CleanReport};
pub use context::{app_name_for, BuildContext, ASSET_HEADER, OBJECT_DIR};
pub use driver::Invocation;
pub use error::{BuildError, BuildResult};
pub use staleness::Staleness;
pub use supervisor::{CommandRunner, ProcessStatus, SystemRunner};
pub use unit::{CompilationUnit, Language, UnitRegistry};

// Re-export the toolchain type for convenience
pub use plugsmith_config::ToolchainConfig;
