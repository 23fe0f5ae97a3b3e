//! Recursive discovery of regular files
//!
//! Failing to open a directory aborts the walk. Problems with a single entry
//! (a dangling symlink, a symlink loop, a socket) are logged and skipped.

use crate::error::{BuildError, BuildResult};
use std::fs::{self, Metadata};
use std::io;
use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

/// Walk `root` recursively, calling `visit` for every regular file
///
/// Symlinks are followed. Entries are visited in file-name order within each
/// directory. Returns the number of files visited.
pub fn walk<F>(root: &Path, mut visit: F) -> BuildResult<usize>
where
    F: FnMut(&Path, &Metadata) -> BuildResult<()>,
{
    fs::read_dir(root).map_err(|e| BuildError::directory_open(root, e))?;

    let mut visited = 0;

    for entry in WalkDir::new(root)
        .follow_links(true)
        .min_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                skip_or_abort(err)?;
                continue;
            }
        };

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!("stat({}): {}", entry.path().display(), err);
                continue;
            }
        };

        if metadata.is_dir() {
            continue;
        }

        if !metadata.is_file() {
            warn!("ignoring {}", entry.path().display());
            continue;
        }

        visit(entry.path(), &metadata)?;
        visited += 1;
    }

    Ok(visited)
}

/// Classify a walkdir error: unreadable directories are fatal, the rest is noise
fn skip_or_abort(err: walkdir::Error) -> BuildResult<()> {
    let Some(path) = err.path().map(Path::to_path_buf) else {
        return Err(BuildError::Io(io::Error::from(err)));
    };

    if err.loop_ancestor().is_some() {
        warn!("ignoring {}: symlink loop", path.display());
        return Ok(());
    }

    let is_dir = fs::metadata(&path).map(|m| m.is_dir()).unwrap_or(false);
    let error = io::Error::from(err);

    if is_dir {
        return Err(BuildError::directory_open(path, error));
    }

    warn!("stat({}): {}", path.display(), error);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn collect(root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        walk(root, |path, _| {
            files.push(path.strip_prefix(root).unwrap().to_path_buf());
            Ok(())
        })
        .unwrap();
        files
    }

    #[test]
    fn test_walk_recurses_in_name_order() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("b/inner")).unwrap();
        fs::write(root.join("c.txt"), "c").unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("b/inner/deep.txt"), "d").unwrap();
        fs::write(root.join("b/z.txt"), "z").unwrap();

        assert_eq!(
            collect(root),
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("b/inner/deep.txt"),
                PathBuf::from("b/z.txt"),
                PathBuf::from("c.txt"),
            ]
        );
    }

    #[test]
    fn test_walk_empty_directory() {
        let temp = TempDir::new().unwrap();
        assert_eq!(walk(temp.path(), |_, _| Ok(())).unwrap(), 0);
    }

    #[test]
    fn test_walk_missing_root_is_fatal() {
        let temp = TempDir::new().unwrap();
        let err = walk(&temp.path().join("nope"), |_, _| Ok(())).unwrap_err();
        assert!(matches!(err, BuildError::DirectoryOpen { .. }));
    }

    #[test]
    fn test_walk_file_as_root_is_fatal() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        assert!(walk(&file, |_, _| Ok(())).is_err());
    }

    #[test]
    fn test_visit_error_aborts_walk() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), "a").unwrap();
        fs::write(temp.path().join("b.txt"), "b").unwrap();

        let mut seen = 0;
        let result = walk(temp.path(), |_, _| {
            seen += 1;
            Err(BuildError::missing_extension("a"))
        });
        assert!(result.is_err());
        assert_eq!(seen, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("real.txt"), "r").unwrap();
        std::os::unix::fs::symlink(root.join("missing"), root.join("broken.txt")).unwrap();

        assert_eq!(collect(root), vec![PathBuf::from("real.txt")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_socket_is_ignored() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("real.txt"), "r").unwrap();
        let _listener = std::os::unix::net::UnixListener::bind(root.join("sock")).unwrap();

        assert_eq!(collect(root), vec![PathBuf::from("real.txt")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_is_visited() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("tree");
        fs::create_dir(&root).unwrap();
        let outside = temp.path().join("outside.txt");
        fs::write(&outside, "o").unwrap();
        std::os::unix::fs::symlink(&outside, root.join("link.txt")).unwrap();

        assert_eq!(collect(&root), vec![PathBuf::from("link.txt")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_is_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir(root.join("d")).unwrap();
        fs::write(root.join("d/a.txt"), "a").unwrap();
        std::os::unix::fs::symlink(root, root.join("d/up")).unwrap();

        assert_eq!(collect(root), vec![PathBuf::from("d/a.txt")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_is_fatal() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let sub = root.join("assets/sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("hidden.css"), "h").unwrap();
        fs::set_permissions(&sub, fs::Permissions::from_mode(0o000)).unwrap();

        // root ignores permission bits
        if fs::read_dir(&sub).is_ok() {
            fs::set_permissions(&sub, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = walk(&root.join("assets"), |_, _| Ok(()));
        fs::set_permissions(&sub, fs::Permissions::from_mode(0o755)).unwrap();

        match result {
            Err(BuildError::DirectoryOpen { path, .. }) => assert_eq!(path, sub),
            other => panic!("expected DirectoryOpen, got {:?}", other),
        }
    }
}
