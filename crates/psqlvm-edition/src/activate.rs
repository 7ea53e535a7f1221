//! Activation: exposing one edition's binaries in the active-use directory.
//!
//! The active-use directory is cleared and repopulated on every activation,
//! never merged. Each binary is linked (or copied) by its own task; one
//! failing binary does not stop the others.

use crate::fsutil::{is_executable, symlink};
use crate::walker::{PathInfo, walk_files};
use futures_util::future::join_all;
use psqlvm_config::ActivationMode;
use psqlvm_core::{EditionId, Error, Result};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Marker written into the copy-mode directory naming the active edition.
pub const ACTIVE_MARKER: &str = ".psqlvm-edition";

/// A binary that could not be exposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFailure {
    /// Entry name in the active-use directory.
    pub name: String,
    /// The binary it should have pointed to.
    pub target: PathBuf,
    pub reason: String,
}

/// Outcome of one activation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationReport {
    /// Directory that was populated.
    pub active_dir: PathBuf,
    /// Entries removed while clearing.
    pub removed: usize,
    /// Entries created, sorted by name.
    pub linked: Vec<PathBuf>,
    /// Binaries that could not be exposed.
    pub failed: Vec<LinkFailure>,
}

impl ActivationReport {
    /// Whether every discovered binary was exposed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Populates an active-use directory.
#[derive(Debug, Clone)]
pub struct Activator {
    active_dir: PathBuf,
    mode: ActivationMode,
    executables_only: bool,
}

impl Activator {
    pub fn new(active_dir: impl Into<PathBuf>, mode: ActivationMode) -> Self {
        Self {
            active_dir: active_dir.into(),
            mode,
            executables_only: false,
        }
    }

    /// Only expose files with an execute bit.
    pub fn executables_only(mut self, yes: bool) -> Self {
        self.executables_only = yes;
        self
    }

    pub fn active_dir(&self) -> &Path {
        &self.active_dir
    }

    /// Replace the active-use directory contents with the binaries under `bin_dir`.
    pub async fn activate(&self, edition: &EditionId, bin_dir: &Path) -> Result<ActivationReport> {
        let root = bin_dir.to_path_buf();
        let executables_only = self.executables_only;
        let binaries = tokio::task::spawn_blocking(move || discover(&root, executables_only))
            .await
            .map_err(|e| Error::Other(e.into()))??;
        debug!(
            edition = %edition,
            count = binaries.len(),
            "discovered binaries"
        );

        fs::create_dir_all(&self.active_dir)
            .map_err(|e| Error::io("failed to create active-use directory", &self.active_dir, e))?;
        let removed = clear_dir(&self.active_dir)?;

        let (unique, mut failed) = dedupe(binaries);

        let mode = self.mode;
        let tasks = unique.into_iter().map(|info| {
            let entry = self.active_dir.join(&info.name);
            async move {
                let result = expose(mode, &info.absolute, &entry).await;
                (info, entry, result)
            }
        });

        let mut linked = Vec::new();
        for (info, entry, result) in join_all(tasks).await {
            match result {
                Ok(()) => {
                    debug!(name = %info.name, target = %info.absolute.display(), "linked");
                    linked.push(entry);
                }
                Err(e) => {
                    warn!(name = %info.name, "failed to link {}: {}", info.absolute.display(), e);
                    failed.push(LinkFailure {
                        name: info.name,
                        target: info.absolute,
                        reason: e.to_string(),
                    });
                }
            }
        }
        linked.sort();
        failed.sort_by(|a, b| a.name.cmp(&b.name));

        if self.mode == ActivationMode::Copy {
            let marker = self.active_dir.join(ACTIVE_MARKER);
            fs::write(&marker, edition.as_str())
                .map_err(|e| Error::io("failed to record active edition", &marker, e))?;
        }

        info!(
            edition = %edition,
            linked = linked.len(),
            failed = failed.len(),
            "activation finished"
        );

        Ok(ActivationReport {
            active_dir: self.active_dir.clone(),
            removed,
            linked,
            failed,
        })
    }

    /// Remove every entry in the active-use directory.
    pub fn clear(&self) -> Result<usize> {
        match fs::metadata(&self.active_dir) {
            Ok(_) => clear_dir(&self.active_dir),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(Error::io("failed to inspect active-use directory", &self.active_dir, e)),
        }
    }

    /// Edition whose binaries currently populate the active-use directory.
    ///
    /// In symlink mode this follows the links back into `install_root`;
    /// links whose target no longer exists are ignored. In copy mode the
    /// marker file is read.
    pub fn current(&self, install_root: &Path) -> Result<Option<EditionId>> {
        if self.mode == ActivationMode::Copy {
            return match fs::read_to_string(self.active_dir.join(ACTIVE_MARKER)) {
                Ok(s) => Ok(s.trim().parse().ok()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(Error::io("failed to read active edition", &self.active_dir, e)),
            };
        }

        let install_root = std::path::absolute(install_root)
            .map_err(|e| Error::io("failed to resolve install root", install_root, e))?;
        let entries = match fs::read_dir(&self.active_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io("failed to list active-use directory", &self.active_dir, e)),
        };

        for entry in entries.flatten() {
            let Ok(target) = fs::read_link(entry.path()) else {
                continue;
            };
            if !target.exists() {
                continue;
            }
            if let Ok(rest) = target.strip_prefix(&install_root)
                && let Some(first) = rest.components().next()
                && let Ok(id) = first.as_os_str().to_string_lossy().parse::<EditionId>()
            {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }
}

fn discover(bin_dir: &Path, executables_only: bool) -> Result<Vec<PathInfo>> {
    let mut files = walk_files(bin_dir)?;
    if executables_only {
        files.retain(|info| {
            fs::metadata(&info.absolute)
                .map(|meta| is_executable(&meta))
                .unwrap_or(false)
        });
    }
    Ok(files)
}

/// Keep the first binary per name, ordered by relative path; later ones fail.
fn dedupe(mut binaries: Vec<PathInfo>) -> (Vec<PathInfo>, Vec<LinkFailure>) {
    binaries.sort_by(|a, b| a.relative.cmp(&b.relative));
    let mut seen: HashMap<String, PathBuf> = HashMap::new();
    let mut unique = Vec::new();
    let mut failed = Vec::new();

    for info in binaries {
        if let Some(first) = seen.get(&info.name) {
            warn!(name = %info.name, "duplicate binary name, keeping {}", first.display());
            failed.push(LinkFailure {
                reason: format!("name already provided by {}", first.display()),
                name: info.name,
                target: info.absolute,
            });
        } else {
            seen.insert(info.name.clone(), info.absolute.clone());
            unique.push(info);
        }
    }
    (unique, failed)
}

fn clear_dir(dir: &Path) -> Result<usize> {
    let entries =
        fs::read_dir(dir).map_err(|e| Error::io("failed to list active-use directory", dir, e))?;
    let mut removed = 0;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io("failed to list active-use directory", dir, e))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| Error::io("failed to stat entry", &path, e))?;
        let result = if file_type.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(|e| Error::io("failed to remove active-use entry", &path, e))?;
        info!(path = %path.display(), "removed active-use entry");
        removed += 1;
    }
    Ok(removed)
}

async fn expose(mode: ActivationMode, target: &Path, entry: &Path) -> io::Result<()> {
    match mode {
        ActivationMode::Symlink => {
            let target = target.to_path_buf();
            let entry = entry.to_path_buf();
            tokio::task::spawn_blocking(move || symlink(&target, &entry))
                .await
                .map_err(io::Error::other)?
        }
        ActivationMode::Copy => tokio::fs::copy(target, entry).await.map(|_| ()),
    }
}
