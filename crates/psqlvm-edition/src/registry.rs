//! Installed edition discovery.
//!
//! An edition is installed when the install root has a subdirectory named
//! exactly after it. Nothing else is consulted.

use crate::catalog::Catalog;
use psqlvm_core::{EditionId, Error, Result};
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// List installed editions, oldest first.
///
/// Only subdirectories whose name is a catalog edition count; other
/// entries in the install root (such as the active-use directory) are
/// ignored. A missing install root means nothing is installed.
pub fn installed_editions(install_root: &Path, catalog: &Catalog) -> Result<Vec<EditionId>> {
    let entries = match fs::read_dir(install_root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(root = %install_root.display(), "install root does not exist");
            return Ok(Vec::new());
        }
        Err(e) => return Err(Error::io("failed to list install root", install_root, e)),
    };

    let mut editions = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io("failed to read install root", install_root, e))?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Ok(id) = EditionId::new(name)
            && catalog.contains(&id)
        {
            editions.push(id);
        }
    }

    editions.sort();
    Ok(editions)
}
