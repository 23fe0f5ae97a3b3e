//! Compilation units and the per-build registry

use crate::error::{BuildError, BuildResult};
use filetime::FileTime;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Source language of a compilation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// C, the default language
    C,
    /// C++, compiled with extra warnings and linked against the C++ runtime
    Cxx,
}

impl Language {
    /// Detect the language from a file extension (without the dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "c" => Some(Self::C),
            "cpp" | "cc" | "cxx" => Some(Self::Cxx),
            _ => None,
        }
    }

    /// Whether this is the secondary (C++) language
    pub fn is_secondary(&self) -> bool {
        matches!(self, Self::Cxx)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::C => write!(f, "c"),
            Self::Cxx => write!(f, "c++"),
        }
    }
}

/// One source file destined for one object file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    /// Logical name, unique within a build
    pub name: String,
    /// Source file handed to the compiler
    pub source: PathBuf,
    /// Object file produced by the compiler
    pub object: PathBuf,
    /// Modification time of the file the unit was discovered from
    pub mtime: FileTime,
    /// Whether the object is missing or stale
    pub needs_rebuild: bool,
    /// Source language
    pub language: Language,
}

impl CompilationUnit {
    /// Create a unit that does not need rebuilding
    pub fn new(
        name: impl Into<String>,
        source: impl Into<PathBuf>,
        object: impl Into<PathBuf>,
        mtime: FileTime,
        language: Language,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            object: object.into(),
            mtime,
            needs_rebuild: false,
            language,
        }
    }

    /// Set the rebuild flag
    pub fn with_rebuild(mut self, needs_rebuild: bool) -> Self {
        self.needs_rebuild = needs_rebuild;
        self
    }
}

/// Insertion-ordered, append-only collection of compilation units
#[derive(Debug, Default)]
pub struct UnitRegistry {
    units: Vec<CompilationUnit>,
    /// Logical name -> file it was discovered from
    origins: HashMap<String, PathBuf>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail if `name` is already taken
    pub fn ensure_unique(&self, name: &str, origin: &Path) -> BuildResult<()> {
        if self.origins.contains_key(name) {
            return Err(BuildError::DuplicateUnit {
                name: name.to_string(),
                path: origin.to_path_buf(),
            });
        }
        Ok(())
    }

    /// Append a unit; `origin` is the file it was discovered from
    pub fn register(&mut self, unit: CompilationUnit, origin: &Path) -> BuildResult<()> {
        self.ensure_unique(&unit.name, origin)?;
        self.origins.insert(unit.name.clone(), origin.to_path_buf());
        self.units.push(unit);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompilationUnit> {
        self.units.iter()
    }

    /// Units flagged for rebuild, in registration order
    pub fn stale(&self) -> impl Iterator<Item = &CompilationUnit> {
        self.units.iter().filter(|u| u.needs_rebuild)
    }

    pub fn stale_count(&self) -> usize {
        self.stale().count()
    }

    /// Whether any unit is C++
    pub fn has_secondary(&self) -> bool {
        self.units.iter().any(|u| u.language.is_secondary())
    }

    /// Every object path, rebuilt or reused
    pub fn objects(&self) -> impl Iterator<Item = &Path> {
        self.units.iter().map(|u| u.object.as_path())
    }
}

impl<'a> IntoIterator for &'a UnitRegistry {
    type Item = &'a CompilationUnit;
    type IntoIter = std::slice::Iter<'a, CompilationUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

/// Flatten a relative path into a single name, joining components with `_`
pub fn flatten_path(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("_")
}
