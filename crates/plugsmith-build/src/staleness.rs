//! Object staleness detection for incremental builds
//!
//! An object is up to date when its modification time is *exactly* the
//! modification time of the source it was compiled from. After every
//! successful compile the object is stamped with the source's time, so an
//! older source (a checkout that rewinds a file) is detected just like a
//! newer one.

use crate::error::{BuildError, BuildResult};
use filetime::FileTime;
use std::fmt;
use std::fs::{self, Metadata};
use std::io;
use std::path::Path;

/// State of an object file relative to its source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    /// No object exists yet
    Missing,
    /// Object exists but was stamped with a different source time
    Modified,
    /// Object matches the source time
    UpToDate,
}

impl Staleness {
    /// Whether the unit has to be recompiled
    pub fn needs_rebuild(&self) -> bool {
        !matches!(self, Self::UpToDate)
    }
}

impl fmt::Display for Staleness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "missing"),
            Self::Modified => write!(f, "modified"),
            Self::UpToDate => write!(f, "up to date"),
        }
    }
}

/// Modification time recorded for a source file
pub fn source_mtime(metadata: &Metadata) -> FileTime {
    FileTime::from_last_modification_time(metadata)
}

/// Compare an object file against the source modification time
///
/// A missing object is stale. Any other `stat` failure is an error.
pub fn check(source_mtime: FileTime, object_path: &Path) -> BuildResult<Staleness> {
    let metadata = match fs::metadata(object_path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Staleness::Missing),
        Err(e) => return Err(BuildError::stat(object_path, e)),
    };

    if FileTime::from_last_modification_time(&metadata) == source_mtime {
        Ok(Staleness::UpToDate)
    } else {
        Ok(Staleness::Modified)
    }
}

/// Whether the object at `object_path` must be rebuilt
pub fn requires_rebuild(source_mtime: FileTime, object_path: &Path) -> BuildResult<bool> {
    check(source_mtime, object_path).map(|s| s.needs_rebuild())
}

/// Stamp a freshly compiled object with its source's modification time
pub fn stamp_object(object_path: &Path, source_mtime: FileTime) -> io::Result<()> {
    filetime::set_file_times(object_path, source_mtime, source_mtime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn test_missing_object_is_stale() {
        let temp = TempDir::new().unwrap();
        let object = temp.path().join("app.c.o");

        let state = check(FileTime::from_unix_time(1_000, 0), &object).unwrap();
        assert_eq!(state, Staleness::Missing);
        assert!(requires_rebuild(FileTime::from_unix_time(1_000, 0), &object).unwrap());
    }

    #[rstest]
    #[case::object_older(900, true)]
    #[case::object_newer(1_100, true)]
    #[case::object_equal(1_000, false)]
    fn test_exact_timestamp_comparison(#[case] object_secs: i64, #[case] stale: bool) {
        let temp = TempDir::new().unwrap();
        let object = temp.path().join("app.c.o");
        fs::write(&object, b"obj").unwrap();
        filetime::set_file_mtime(&object, FileTime::from_unix_time(object_secs, 0)).unwrap();

        let source = FileTime::from_unix_time(1_000, 0);
        assert_eq!(requires_rebuild(source, &object).unwrap(), stale);
    }

    #[test]
    fn test_sub_second_difference_is_stale() {
        let temp = TempDir::new().unwrap();
        let object = temp.path().join("app.c.o");
        fs::write(&object, b"obj").unwrap();
        let stamped = FileTime::from_unix_time(1_000, 250_000_000);
        filetime::set_file_mtime(&object, stamped).unwrap();

        let stored = FileTime::from_last_modification_time(&fs::metadata(&object).unwrap());
        assert_eq!(stored, stamped);

        let source = FileTime::from_unix_time(1_000, 500_000_000);
        assert_eq!(check(source, &object).unwrap(), Staleness::Modified);
        assert_eq!(check(stamped, &object).unwrap(), Staleness::UpToDate);
    }

    #[test]
    fn test_stamp_makes_object_current() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("app.c");
        let object = temp.path().join("app.c.o");
        fs::write(&source, "int x;").unwrap();
        fs::write(&object, b"obj").unwrap();
        filetime::set_file_mtime(&source, FileTime::from_unix_time(1_234_567, 0)).unwrap();

        let mtime = source_mtime(&fs::metadata(&source).unwrap());
        stamp_object(&object, mtime).unwrap();

        assert_eq!(check(mtime, &object).unwrap(), Staleness::UpToDate);
    }

    #[cfg(unix)]
    #[test]
    fn test_unexpected_stat_failure_is_error() {
        let temp = TempDir::new().unwrap();
        let not_a_dir = temp.path().join("file");
        fs::write(&not_a_dir, "x").unwrap();

        // ENOTDIR rather than ENOENT
        let result = check(FileTime::zero(), &not_a_dir.join("app.c.o"));
        assert!(matches!(result, Err(BuildError::Stat { .. })));
    }

    #[test]
    fn test_staleness_display() {
        assert_eq!(Staleness::Missing.to_string(), "missing");
        assert_eq!(Staleness::Modified.to_string(), "modified");
        assert_eq!(Staleness::UpToDate.to_string(), "up to date");
    }
}
