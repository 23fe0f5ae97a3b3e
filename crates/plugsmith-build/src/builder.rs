//! Build orchestration
use crate::assets::{self, AssetHeader, EmbedOutcome};
use crate::context::BuildContext;
use crate::driver;
use crate::error::{BuildError, BuildResult};
use crate::staleness;
use crate::supervisor::{self, CommandRunner, SystemRunner};
use crate::unit::{flatten_path, CompilationUnit, Language, UnitRegistry};
use crate::walker;

use serde::Serialize;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Build statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildStats {
    /// Registered compilation units (sources and assets)
    pub units: usize,
    /// Units compiled during this build
    pub compiled: usize,
    /// Units whose object was reused
    pub reused: usize,
    /// Assets whose C source was regenerated
    pub assets_embedded: usize,
    /// Assets whose object was reused
    pub assets_reused: usize,
    /// Empty assets that were skipped
    pub assets_skipped: usize,
    /// Total build time
    #[serde(with = "serde_secs")]
    pub total_time: Duration,
    /// Time spent in the compiler
    #[serde(with = "serde_secs")]
    pub compilation_time: Duration,
    /// Time spent in the linker
    #[serde(with = "serde_secs")]
    pub linking_time: Duration,
}

impl BuildStats {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Result of a successful build
#[derive(Debug, Clone, Serialize)]
pub struct BuildOutcome {
    /// Application name
    pub app_name: String,
    /// Shared library path
    pub output: PathBuf,
    /// Logical names of the units compiled, in compile order
    pub compiled: Vec<String>,
    /// Whether the shared library was relinked
    pub linked: bool,
    /// Build statistics
    pub stats: BuildStats,
}

impl BuildOutcome {
    /// True when nothing had to be compiled or linked
    pub fn is_up_to_date(&self) -> bool {
        !self.linked
    }
}

/// What `clean` removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    /// Files deleted from the object directory
    pub objects_removed: usize,
    /// Whether the shared library was deleted
    pub output_removed: bool,
}

/// Drives one build of one project
pub struct Builder {
    context: BuildContext,
    runner: Box<dyn CommandRunner>,
}

impl Builder {
    /// Create a builder that runs the real toolchain
    pub fn new(context: BuildContext) -> Self {
        Self {
            context,
            runner: Box::new(SystemRunner),
        }
    }

    /// Replace the process runner
    pub fn with_runner(mut self, runner: Box<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    /// Execute the build
    ///
    /// Embeds assets, compiles every stale unit and relinks the shared
    /// library if anything was compiled. The first failure aborts the build;
    /// objects compiled before it stay on disk.
    ///
    /// Objects are stamped as soon as they compile, so when the link itself
    /// fails the next build finds nothing stale and does not relink. Run
    /// `clean` or touch a source to force the link.
    pub fn build(&mut self) -> BuildResult<BuildOutcome> {
        let build_start = Instant::now();
        let ctx = &self.context;

        let objs_dir = ctx.objs_dir();
        if !objs_dir.is_dir() {
            fs::create_dir_all(&objs_dir).map_err(|e| BuildError::io(&objs_dir, e))?;
        }

        assets::remove_stale_header(&ctx.asset_header_path())?;

        let mut registry = UnitRegistry::new();
        let mut stats = BuildStats::new();

        let header = if ctx.assets_dir().is_dir() {
            Some(embed_assets(ctx, &mut registry, &mut stats)?)
        } else {
            None
        };

        register_sources(ctx, &mut registry)?;

        let compile_start = Instant::now();
        let mut compiled = Vec::new();
        for unit in registry.stale() {
            info!("compiling {}", unit.name);
            let invocation = driver::compile_invocation(ctx, unit);
            supervisor::supervise(self.runner.as_mut(), "compile", &invocation)?;

            if let Err(e) = staleness::stamp_object(&unit.object, unit.mtime) {
                warn!("utime({}): {}", unit.object.display(), e);
            }
            compiled.push(unit.name.clone());
        }
        let compilation_time = compile_start.elapsed();

        drop(header);

        let link_start = Instant::now();
        let linked = !compiled.is_empty();
        if linked {
            info!("linking {}", ctx.output_path().display());
            let invocation = driver::link_invocation(ctx, &registry);
            supervisor::supervise(self.runner.as_mut(), "link", &invocation)?;
        } else {
            debug!("all {} objects up to date", registry.len());
        }
        let linking_time = link_start.elapsed();

        stats.units = registry.len();
        stats.compiled = compiled.len();
        stats.reused = registry.len() - compiled.len();
        stats.compilation_time = compilation_time;
        stats.linking_time = linking_time;
        stats.total_time = build_start.elapsed();

        Ok(BuildOutcome {
            app_name: ctx.app_name().to_string(),
            output: ctx.output_path(),
            compiled,
            linked,
            stats,
        })
    }

    /// Remove build products
    ///
    /// Deletes every file under the object directory, the directory itself
    /// and the shared library. Individual failures are logged and skipped.
    pub fn clean(&self) -> BuildResult<CleanReport> {
        let ctx = &self.context;
        let mut report = CleanReport::default();

        let objs_dir = ctx.objs_dir();
        if objs_dir.is_dir() {
            walker::walk(&objs_dir, |path, _| {
                match fs::remove_file(path) {
                    Ok(()) => report.objects_removed += 1,
                    Err(e) => warn!("couldn't unlink {}: {}", path.display(), e),
                }
                Ok(())
            })?;

            if let Err(e) = fs::remove_dir(&objs_dir) {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("couldn't rmdir {}: {}", objs_dir.display(), e);
                }
            }
        }

        let output = ctx.output_path();
        match fs::remove_file(&output) {
            Ok(()) => report.output_removed = true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("couldn't unlink {}: {}", output.display(), e),
        }

        Ok(report)
    }
}

/// Embed every asset and return the finished header
fn embed_assets(
    ctx: &BuildContext,
    registry: &mut UnitRegistry,
    stats: &mut BuildStats,
) -> BuildResult<AssetHeader> {
    let assets_dir = ctx.assets_dir();
    let mut header = AssetHeader::create(ctx.asset_header_path())?;

    walker::walk(&assets_dir, |path, metadata| {
        let relative = path.strip_prefix(&assets_dir).unwrap_or(path);
        match assets::embed_asset(ctx, &mut header, registry, relative, path, metadata)? {
            EmbedOutcome::Skipped => stats.assets_skipped += 1,
            EmbedOutcome::Reused => stats.assets_reused += 1,
            EmbedOutcome::Generated => stats.assets_embedded += 1,
        }
        Ok(())
    })?;

    header.finish()?;
    debug!(
        "declared {} assets in {}",
        header.declared(),
        header.path().display()
    );
    Ok(header)
}

/// Register every C and C++ file under `src/`
fn register_sources(ctx: &BuildContext, registry: &mut UnitRegistry) -> BuildResult<()> {
    let src_dir = ctx.src_dir();

    walker::walk(&src_dir, |path, metadata| {
        let Some(language) = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Language::from_extension)
        else {
            return Ok(());
        };

        let relative = path.strip_prefix(&src_dir).unwrap_or(path);
        let name = flatten_path(relative);
        let object = ctx.object_path(&name);
        let mtime = staleness::source_mtime(metadata);
        let state = staleness::check(mtime, &object)?;
        debug!(unit = %name, %state, %language, "registered source");

        let unit = CompilationUnit::new(name, path, object, mtime, language)
            .with_rebuild(state.needs_rebuild());
        registry.register(unit, path)
    })?;

    Ok(())
}

/// Serialize durations as fractional seconds
mod serde_secs {
    use serde::{Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }
}
