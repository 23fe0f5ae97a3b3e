//! Static asset embedding
//!
//! Every non-empty file under `assets/` becomes a generated C source in the
//! object directory that exposes three symbols:
//!
//! - `u_int8_t asset_<name>_<ext>[]`: the bytes, followed by one NUL that is
//!   not counted in the length so text assets can be used as C strings
//! - `u_int32_t asset_len_<name>_<ext>`: the byte count
//! - `time_t asset_mtime_<name>_<ext>`: the asset's modification time
//!
//! Forward declarations for all of them go into `src/assets.h`, which only
//! exists while a build is running.

use crate::context::BuildContext;
use crate::error::{BuildError, BuildResult};
use crate::staleness;
use crate::unit::{CompilationUnit, Language, UnitRegistry};
use filetime::FileTime;
use memmap2::Mmap;
use std::fs::{self, File, Metadata};
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

const HEADER_GUARD: &str = "__H_PLUGSMITH_ASSETS_H";
const BYTES_PER_LINE: usize = 16;

/// Replace characters that cannot appear in a C identifier segment
///
/// `.`, `-` and whitespace become `_`.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c == '.' || c == '-' || c.is_whitespace() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Symbol naming for one asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSymbol {
    /// Sanitized path without the extension (`css/site.css` -> `css_site`)
    pub name: String,
    /// Sanitized extension (`css`)
    pub extension: String,
}

impl AssetSymbol {
    /// Derive the symbol from a path relative to the assets directory
    pub fn from_relative_path(relative: &Path) -> BuildResult<Self> {
        let file_name = relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let (stem, extension) = file_name
            .rsplit_once('.')
            .ok_or_else(|| BuildError::missing_extension(&file_name))?;

        let mut base = String::new();
        if let Some(parent) = relative.parent() {
            for component in parent.components() {
                if let Component::Normal(part) = component {
                    base.push_str(&part.to_string_lossy());
                    base.push('_');
                }
            }
        }
        base.push_str(stem);

        Ok(Self {
            name: sanitize(&base),
            extension: sanitize(extension),
        })
    }

    /// Logical unit name, also the stem of the generated source and object
    pub fn unit_name(&self) -> String {
        format!("{}_{}", self.name, self.extension)
    }

    pub fn data_symbol(&self) -> String {
        format!("asset_{}_{}", self.name, self.extension)
    }

    pub fn len_symbol(&self) -> String {
        format!("asset_len_{}_{}", self.name, self.extension)
    }

    pub fn mtime_symbol(&self) -> String {
        format!("asset_mtime_{}_{}", self.name, self.extension)
    }

    /// The three `extern` declarations for the asset header
    pub fn declarations(&self) -> String {
        format!(
            "extern u_int8_t {}[];\nextern u_int32_t {};\nextern time_t {};\n",
            self.data_symbol(),
            self.len_symbol(),
            self.mtime_symbol()
        )
    }
}

/// The generated `assets.h`, removed again when dropped
///
/// Dropping the header deletes the file, so it does not outlive the build
/// even when the build fails halfway.
#[derive(Debug)]
pub struct AssetHeader {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    declared: usize,
}

impl AssetHeader {
    /// Create the header and write the opening include guard
    pub fn create(path: impl Into<PathBuf>) -> BuildResult<Self> {
        let path = path.into();
        let file = File::create(&path).map_err(|e| BuildError::io(&path, e))?;
        let mut header = Self {
            path,
            writer: Some(BufWriter::new(file)),
            declared: 0,
        };
        header.write(&format!("#ifndef {0}\n#define {0}\n", HEADER_GUARD))?;
        Ok(header)
    }

    /// Append the declarations for one asset
    pub fn declare(&mut self, symbol: &AssetSymbol) -> BuildResult<()> {
        self.write(&symbol.declarations())?;
        self.declared += 1;
        Ok(())
    }

    /// Close the include guard and flush to disk
    pub fn finish(&mut self) -> BuildResult<()> {
        self.write("\n#endif\n")?;
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| BuildError::io(&self.path, e))?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of assets declared so far
    pub fn declared(&self) -> usize {
        self.declared
    }

    fn write(&mut self, text: &str) -> BuildResult<()> {
        match self.writer.as_mut() {
            Some(writer) => writer
                .write_all(text.as_bytes())
                .map_err(|e| BuildError::io(&self.path, e)),
            None => Err(BuildError::io(
                &self.path,
                io::Error::new(io::ErrorKind::Other, "asset header already finished"),
            )),
        }
    }
}

impl Drop for AssetHeader {
    fn drop(&mut self) {
        self.writer.take();
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("couldn't remove {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Remove a header left behind by an earlier run
pub fn remove_stale_header(path: &Path) -> BuildResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BuildError::io(path, e)),
    }
}

/// Write the generated C source for one asset
pub fn write_asset_source<W: Write>(
    out: &mut W,
    symbol: &AssetSymbol,
    data: &[u8],
    mtime_secs: i64,
) -> io::Result<()> {
    writeln!(out, "/* Auto generated by plugsmith */")?;
    writeln!(out, "#include <sys/types.h>")?;
    writeln!(out, "#include <time.h>")?;
    writeln!(out)?;
    writeln!(out, "u_int8_t {}[] = {{", symbol.data_symbol())?;

    for chunk in data.chunks(BYTES_PER_LINE) {
        out.write_all(b"\t")?;
        for byte in chunk {
            write!(out, "0x{:02x},", byte)?;
        }
        out.write_all(b"\n")?;
    }

    writeln!(out, "\t0x00")?;
    writeln!(out, "}};")?;
    writeln!(out)?;
    writeln!(out, "u_int32_t {} = {};", symbol.len_symbol(), data.len())?;
    writeln!(out, "time_t {} = {};", symbol.mtime_symbol(), mtime_secs)?;
    Ok(())
}

/// What happened to one asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedOutcome {
    /// Empty file, nothing emitted
    Skipped,
    /// Object is current; declarations emitted, no rebuild
    Reused,
    /// Source regenerated; unit flagged for rebuild
    Generated,
}

/// Embed one asset found at `path` (relative path `relative` under `assets/`)
pub fn embed_asset(
    ctx: &BuildContext,
    header: &mut AssetHeader,
    registry: &mut UnitRegistry,
    relative: &Path,
    path: &Path,
    metadata: &Metadata,
) -> BuildResult<EmbedOutcome> {
    let symbol = AssetSymbol::from_relative_path(relative)?;
    let name = symbol.unit_name();

    if metadata.len() == 0 {
        warn!("skipping empty asset {}", relative.display());
        return Ok(EmbedOutcome::Skipped);
    }

    registry.ensure_unique(&name, path)?;

    let object = ctx.object_path(&name);
    let source = ctx.generated_source_path(&name);
    let mtime = staleness::source_mtime(metadata);

    if !staleness::requires_rebuild(mtime, &object)? {
        debug!(asset = %relative.display(), "asset object up to date");
        header.declare(&symbol)?;
        let unit = CompilationUnit::new(name, source, object, mtime, Language::C);
        registry.register(unit, path)?;
        return Ok(EmbedOutcome::Reused);
    }

    if metadata.len() > u64::from(u32::MAX) {
        return Err(BuildError::AssetTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
        });
    }

    info!("building asset {}", relative.display());
    generate_source(path, &source, &symbol, mtime)?;

    header.declare(&symbol)?;
    let unit = CompilationUnit::new(name, source, object, mtime, Language::C).with_rebuild(true);
    registry.register(unit, path)?;
    Ok(EmbedOutcome::Generated)
}

fn generate_source(
    asset: &Path,
    source: &Path,
    symbol: &AssetSymbol,
    mtime: FileTime,
) -> BuildResult<()> {
    let input = File::open(asset).map_err(|e| BuildError::io(asset, e))?;
    // SAFETY: the map is read-only and dropped before this function returns;
    // the build owns the project tree for its duration.
    let data = unsafe { Mmap::map(&input) }.map_err(|e| BuildError::io(asset, e))?;

    let output = File::create(source).map_err(|e| BuildError::io(source, e))?;
    let mut writer = BufWriter::new(output);
    write_asset_source(&mut writer, symbol, &data, mtime.unix_seconds())
        .and_then(|()| writer.flush())
        .map_err(|e| BuildError::io(source, e))
}
