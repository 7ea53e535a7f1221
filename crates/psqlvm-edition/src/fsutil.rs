//! Filesystem helpers.

use psqlvm_core::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Copy the tree under `from` into the existing directory `to`.
///
/// Symlinks are recreated rather than followed. Uses an explicit stack like
/// the walker.
pub fn copy_tree(from: &Path, to: &Path) -> Result<u64> {
    let mut copied = 0;
    let mut pending = vec![PathBuf::new()];

    while let Some(relative_dir) = pending.pop() {
        let src_dir = from.join(&relative_dir);
        let entries =
            fs::read_dir(&src_dir).map_err(|e| Error::io("failed to list directory", &src_dir, e))?;

        for entry in entries {
            let entry = entry.map_err(|e| Error::io("failed to read directory entry", &src_dir, e))?;
            let relative = relative_dir.join(entry.file_name());
            let src = entry.path();
            let dest = to.join(&relative);
            let file_type = entry
                .file_type()
                .map_err(|e| Error::io("failed to stat entry", &src, e))?;

            if file_type.is_dir() {
                fs::create_dir_all(&dest)
                    .map_err(|e| Error::io("failed to create directory", &dest, e))?;
                pending.push(relative);
            } else if file_type.is_symlink() {
                let target =
                    fs::read_link(&src).map_err(|e| Error::io("failed to read symlink", &src, e))?;
                symlink(&target, &dest).map_err(|e| Error::io("failed to create symlink", &dest, e))?;
                copied += 1;
            } else {
                fs::copy(&src, &dest).map_err(|e| Error::io("failed to copy file", &dest, e))?;
                copied += 1;
            }
        }
    }

    Ok(copied)
}

/// Remove a directory tree, treating absence as success.
///
/// Returns whether anything was removed.
pub fn remove_tree(path: &Path) -> Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io("failed to remove directory", path, e)),
    }
}

/// Remove a file, treating absence as success.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io("failed to remove file", path, e)),
    }
}

#[cfg(unix)]
pub(crate) fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
pub(crate) fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(unix)]
pub(crate) fn is_executable(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
pub(crate) fn is_executable(_meta: &fs::Metadata) -> bool {
    true
}
