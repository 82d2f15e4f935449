//! Tree scanner: walks a root and records relative file and directory paths.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::SyncError;

/// Relative paths of every regular file under a root.
pub type FileSet = BTreeSet<PathBuf>;

/// Relative paths of every directory under a root, the root itself excluded.
pub type DirectorySet = BTreeSet<PathBuf>;

/// Both sets produced by a single walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSnapshot {
    pub files: FileSet,
    pub directories: DirectorySet,
}

/// Walk `root` recursively.
///
/// A root that does not exist yields an empty snapshot. Symlinks are recorded
/// as files unless they resolve to a directory, so a dangling link is a file.
/// Symlinked directories are neither recorded nor entered.
pub fn scan(root: &Path) -> Result<TreeSnapshot, SyncError> {
    let mut snapshot = TreeSnapshot::default();

    match std::fs::metadata(root) {
        Ok(_) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(snapshot),
        Err(err) => return Err(scan_err(root, err)),
    }

    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(root).to_path_buf();
            scan_err(path, err.into())
        })?;

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let file_type = entry.file_type();
        if file_type.is_dir() {
            snapshot.directories.insert(relative.to_path_buf());
        } else if file_type.is_file() || (file_type.is_symlink() && !entry.path().is_dir()) {
            snapshot.files.insert(relative.to_path_buf());
        }
    }

    Ok(snapshot)
}

/// Relative paths of all files under `root`.
pub fn scan_files(root: &Path) -> Result<FileSet, SyncError> {
    Ok(scan(root)?.files)
}

/// Relative paths of all subdirectories under `root`.
pub fn scan_directories(root: &Path) -> Result<DirectorySet, SyncError> {
    Ok(scan(root)?.directories)
}

fn scan_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Scan {
        path: path.into(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn set(paths: &[&str]) -> BTreeSet<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn missing_root_is_empty() {
        let tmp = TempDir::new().unwrap();
        let snapshot = scan(&tmp.path().join("not-yet")).unwrap();
        assert!(snapshot.files.is_empty());
        assert!(snapshot.directories.is_empty());
    }

    #[test]
    fn records_relative_files_and_directories() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("docs/guides")).unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        fs::write(root.join("top.txt"), "t").unwrap();
        fs::write(root.join("docs/readme.md"), "r").unwrap();
        fs::write(root.join("docs/guides/intro.md"), "i").unwrap();

        let snapshot = scan(root).unwrap();
        assert_eq!(
            snapshot.files,
            set(&["top.txt", "docs/readme.md", "docs/guides/intro.md"])
        );
        assert_eq!(snapshot.directories, set(&["docs", "docs/guides", "empty"]));
    }

    #[test]
    fn root_itself_is_not_a_directory_entry() {
        let tmp = TempDir::new().unwrap();
        let snapshot = scan(tmp.path()).unwrap();
        assert!(snapshot.directories.is_empty());
    }

    #[test]
    fn split_helpers_agree_with_scan() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("a/b")).unwrap();
        fs::write(tmp.path().join("a/b/c.txt"), "c").unwrap();

        assert_eq!(scan_files(tmp.path()).unwrap(), set(&["a/b/c.txt"]));
        assert_eq!(scan_directories(tmp.path()).unwrap(), set(&["a", "a/b"]));
    }

    #[test]
    #[cfg(unix)]
    fn symlinked_file_counts_as_file_and_symlinked_dir_is_skipped() {
        use std::os::unix::fs::symlink;

        let outside = TempDir::new().unwrap();
        fs::create_dir_all(outside.path().join("dir")).unwrap();
        fs::write(outside.path().join("dir/inner.txt"), "x").unwrap();
        fs::write(outside.path().join("target.txt"), "x").unwrap();

        let tmp = TempDir::new().unwrap();
        symlink(outside.path().join("target.txt"), tmp.path().join("link.txt")).unwrap();
        symlink(outside.path().join("dir"), tmp.path().join("linkdir")).unwrap();

        let snapshot = scan(tmp.path()).unwrap();
        assert_eq!(snapshot.files, set(&["link.txt"]));
        assert!(snapshot.directories.is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn dangling_symlink_counts_as_file() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().unwrap();
        symlink(tmp.path().join("gone.txt"), tmp.path().join("stale-link")).unwrap();

        let snapshot = scan(tmp.path()).unwrap();
        assert_eq!(snapshot.files, set(&["stale-link"]));
        assert!(snapshot.directories.is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn unreadable_directory_is_a_scan_error() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let locked = tmp.path().join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("secret.txt"), "s").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can read the directory anyway; nothing to assert then.
        let readable = fs::read_dir(&locked).is_ok();
        let result = scan(tmp.path());

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        if readable {
            return;
        }
        match result {
            Err(SyncError::Scan { path, .. }) => assert!(path.starts_with(tmp.path())),
            other => panic!("expected scan error, got {other:?}"),
        }
    }
}
