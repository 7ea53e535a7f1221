//! Depth-first filesystem traversal.
//!
//! The walker keeps pending directories on an explicit stack, so deep trees
//! never grow the call stack. Sibling order is whatever the OS returns.
//! Callers that need a stable order sort the result.

use psqlvm_core::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

/// One file found by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathInfo {
    /// Absolute path of the file.
    pub absolute: PathBuf,
    /// Path relative to the scan root.
    pub relative: PathBuf,
    /// Base name.
    pub name: String,
}

/// Iterative depth-first walker.
#[derive(Debug, Clone)]
pub struct Walker {
    root: PathBuf,
}

impl Walker {
    /// Walk the tree under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Run the traversal.
    ///
    /// Regular files are reported, as are symlinks that resolve to files.
    /// Symlinked directories are not followed and dangling links are
    /// skipped. If any directory cannot be listed, the whole walk fails.
    ///
    /// A relative root is resolved against the working directory first, so
    /// `absolute` is always absolute.
    pub fn walk(&self) -> Result<Vec<PathInfo>> {
        let root = std::path::absolute(&self.root)
            .map_err(|e| Error::io("failed to resolve directory", &self.root, e))?;
        let mut found = Vec::new();
        let mut pending = vec![PathBuf::new()];

        while let Some(relative_dir) = pending.pop() {
            let dir = root.join(&relative_dir);
            let entries = fs::read_dir(&dir)
                .map_err(|e| Error::io("failed to list directory", &dir, e))?;

            for entry in entries {
                let entry = entry.map_err(|e| Error::io("failed to read directory entry", &dir, e))?;
                let file_type = entry
                    .file_type()
                    .map_err(|e| Error::io("failed to stat entry", entry.path(), e))?;
                let relative = relative_dir.join(entry.file_name());
                let absolute = entry.path();

                if file_type.is_dir() {
                    pending.push(relative);
                    continue;
                }
                if file_type.is_symlink() {
                    match fs::metadata(&absolute) {
                        Ok(meta) if meta.is_file() => {}
                        _ => {
                            trace!(path = %absolute.display(), "skipping symlink");
                            continue;
                        }
                    }
                } else if !file_type.is_file() {
                    continue;
                }

                found.push(PathInfo {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    absolute,
                    relative,
                });
            }
        }

        Ok(found)
    }
}

/// All files under `root`.
pub fn walk_files(root: &Path) -> Result<Vec<PathInfo>> {
    Walker::new(root).walk()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel).unwrap();
    }

    #[test]
    fn test_walk_nested_tree() {
        let tmp = TempDir::new().unwrap();
        let files = [
            "top.txt",
            "a/one",
            "a/b/two",
            "a/b/c/d/e/three",
            "x/four",
            "x/y/five",
        ];
        for f in files {
            touch(tmp.path(), f);
        }
        fs::create_dir_all(tmp.path().join("empty/nested")).unwrap();

        let found = walk_files(tmp.path()).unwrap();
        assert_eq!(found.len(), files.len());

        let relatives: BTreeSet<PathBuf> = found.iter().map(|p| p.relative.clone()).collect();
        let expected: BTreeSet<PathBuf> = files.iter().map(PathBuf::from).collect();
        assert_eq!(relatives, expected);

        for info in &found {
            assert_eq!(tmp.path().join(&info.relative), info.absolute);
            assert_eq!(
                info.name,
                info.relative.file_name().unwrap().to_string_lossy()
            );
        }
    }

    #[test]
    fn test_relative_root_yields_absolute_paths() {
        let cwd = std::env::current_dir().unwrap();
        let tmp = tempfile::tempdir_in(&cwd).unwrap();
        let relative_root = tmp.path().strip_prefix(&cwd).unwrap();
        assert!(relative_root.is_relative());
        touch(tmp.path(), "bin/psql/psql");

        let found = walk_files(relative_root).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].absolute.is_absolute());
        assert!(found[0].absolute.is_file());
        assert_eq!(found[0].relative, PathBuf::from("bin/psql/psql"));
    }

    #[test]
    fn test_missing_root_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = walk_files(&tmp.path().join("nope")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "real/file");
        std::os::unix::fs::symlink(tmp.path().join("real/file"), tmp.path().join("link")).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("real"), tmp.path().join("dirlink")).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("gone"), tmp.path().join("dangling")).unwrap();

        let found = walk_files(tmp.path()).unwrap();
        let relatives: BTreeSet<PathBuf> = found.iter().map(|p| p.relative.clone()).collect();
        assert_eq!(
            relatives,
            BTreeSet::from([PathBuf::from("real/file"), PathBuf::from("link")])
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_unlistable_directory_fails_whole_walk() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "ok/file");
        touch(tmp.path(), "locked/secret");
        let locked = tmp.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores directory permissions.
        let readable = fs::read_dir(&locked).is_ok();
        let result = walk_files(tmp.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        if !readable {
            assert!(matches!(result.unwrap_err(), Error::Io { .. }));
        }
    }
}
