//! The edition lifecycle.
//!
//! ```text
//! Unknown -> Downloaded -> Extracted -> SourceInstalled -> Built -> Active
//!                                              \_____________\________\__-> Removed
//! ```
//!
//! The edition directory under the install root is the only record of an
//! install. Nothing is rolled back on failure: a failed build leaves the
//! source tree in place so `make` can be re-run by hand.

use crate::activate::{ActivationReport, Activator};
use crate::build::{BuildDriver, NativeBuildDriver};
use crate::catalog::Catalog;
use crate::fetch::{ArchiveFetcher, HttpFetcher};
use crate::fsutil::{copy_tree, remove_file_if_exists, remove_tree};
use crate::registry::installed_editions;
use psqlvm_config::{Config, Paths, Settings};
use psqlvm_core::{EditionId, Error, Fix, Result};
use psqlvm_ui::Output;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Written into an edition directory once every build target succeeded.
pub const BUILD_MARKER: &str = ".psqlvm-build";

/// Directory under the install root recording removed editions.
pub const REMOVED_DIR: &str = ".removed";

/// Where an edition is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditionState {
    Unknown,
    Downloaded,
    Extracted,
    SourceInstalled,
    Built,
    Active,
    Removed,
}

impl EditionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditionState::Unknown => "unknown",
            EditionState::Downloaded => "downloaded",
            EditionState::Extracted => "extracted",
            EditionState::SourceInstalled => "source-installed",
            EditionState::Built => "built",
            EditionState::Active => "active",
            EditionState::Removed => "removed",
        }
    }
}

impl fmt::Display for EditionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn transition(edition: &EditionId, from: EditionState, to: EditionState) {
    debug!(edition = %edition, from = %from, to = %to, "edition state transition");
}

/// Options for [`EditionManager::install`].
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Download the archive even if a cached copy exists.
    pub refetch: bool,
}

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub edition: EditionId,
    /// The edition's install directory.
    pub install_dir: PathBuf,
    /// Whether a cached archive was used instead of downloading.
    pub reused_archive: bool,
}

/// Result of a remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveOutcome {
    /// Whether a directory was actually deleted.
    pub removed: bool,
    /// Whether the edition was active and its entries were cleared.
    pub deactivated: bool,
}

/// Manager wired to the real HTTP fetcher and native build driver.
pub type DefaultEditionManager = EditionManager<HttpFetcher, NativeBuildDriver>;

/// Orchestrates install, activate and remove.
pub struct EditionManager<F, B> {
    paths: Paths,
    config: Config,
    catalog: Catalog,
    fetcher: F,
    driver: B,
}

impl DefaultEditionManager {
    /// Build a manager from process settings.
    pub fn from_settings(settings: &Settings, output: Output) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(&settings.config.source)?.with_output(output);
        let driver = NativeBuildDriver::new(&settings.config.build, output);
        Ok(Self::new(
            settings.paths.clone(),
            settings.config.clone(),
            Catalog::from_config(&settings.config)?,
            fetcher,
            driver,
        ))
    }
}

impl<F: ArchiveFetcher, B: BuildDriver> EditionManager<F, B> {
    pub fn new(paths: Paths, config: Config, catalog: Catalog, fetcher: F, driver: B) -> Self {
        Self {
            paths,
            config,
            catalog,
            fetcher,
            driver,
        }
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn removed_marker(&self, edition: &EditionId) -> PathBuf {
        self.paths
            .install_root()
            .join(REMOVED_DIR)
            .join(edition.as_str())
    }

    fn activator(&self) -> Activator {
        Activator::new(
            self.paths.active_dir_for(self.config.activation.mode),
            self.config.activation.mode,
        )
        .executables_only(self.config.activation.executables_only)
    }

    /// Installed editions, oldest first.
    pub fn installed(&self) -> Result<Vec<EditionId>> {
        installed_editions(self.paths.install_root(), &self.catalog)
    }

    /// The currently active edition, if any.
    pub fn active(&self) -> Result<Option<EditionId>> {
        let current = self.activator().current(self.paths.install_root())?;
        Ok(current.filter(|e| self.paths.edition_dir(e).is_dir()))
    }

    /// Inspect the disk to find an edition's state.
    pub fn state(&self, edition: &EditionId) -> Result<EditionState> {
        if self.paths.edition_dir(edition).is_dir() {
            if self.active()?.as_ref() == Some(edition) {
                return Ok(EditionState::Active);
            }
            if self.paths.edition_dir(edition).join(BUILD_MARKER).is_file() {
                return Ok(EditionState::Built);
            }
            return Ok(EditionState::SourceInstalled);
        }
        if self.removed_marker(edition).is_file() {
            return Ok(EditionState::Removed);
        }
        if self.paths.extracted_source_dir(edition).is_dir() {
            return Ok(EditionState::Extracted);
        }
        if self.paths.archive_path(edition).is_file() {
            return Ok(EditionState::Downloaded);
        }
        Ok(EditionState::Unknown)
    }

    fn require_installed(&self, edition: &EditionId) -> Result<()> {
        let installed = self.installed()?;
        if installed.contains(edition) {
            Ok(())
        } else {
            Err(Error::unknown_edition(
                edition.as_str(),
                installed.iter().map(|e| e.to_string()).collect(),
            ))
        }
    }

    fn already_installed(&self, edition: &EditionId, path: PathBuf) -> Error {
        Error::AlreadyInstalled {
            edition: edition.to_string(),
            path,
            fixes: vec![Fix::with_command(
                "Remove it first",
                format!("psqlvm clean {}", edition),
            )],
        }
    }

    /// Download, extract, copy and build an edition.
    pub async fn install(
        &self,
        edition: &EditionId,
        options: &InstallOptions,
    ) -> Result<InstallOutcome> {
        if !self.catalog.contains(edition) {
            return Err(Error::unknown_edition(edition.as_str(), self.catalog.names()));
        }

        let install_dir = self.paths.edition_dir(edition);
        if install_dir.exists() {
            return Err(self.already_installed(edition, install_dir));
        }

        // 1. Fetch
        let download_dir = self.paths.download_dir();
        create_dir_all(download_dir, "failed to create download directory")?;

        let archive = self.paths.archive_path(edition);
        let reused_archive = !options.refetch && archive.is_file();
        if reused_archive {
            info!(edition = %edition, "reusing cached archive {}", archive.display());
        } else {
            remove_file_if_exists(&archive)?;
            if let Err(err) = self.fetcher.fetch(edition, &archive).await {
                if let Err(e) = remove_file_if_exists(&archive) {
                    warn!("could not remove partial archive: {}", e);
                }
                return Err(err);
            }
        }
        transition(edition, EditionState::Unknown, EditionState::Downloaded);

        // 2. Extract
        self.driver.extract(&archive, download_dir).await?;
        let source_dir = self.paths.extracted_source_dir(edition);
        if !source_dir.is_dir() {
            return Err(Error::Extraction {
                archive,
                source: io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("archive did not contain {}", source_dir.display()),
                ),
            });
        }
        transition(edition, EditionState::Downloaded, EditionState::Extracted);

        // 3. Copy into the install root
        create_dir_all(self.paths.install_root(), "failed to create install root")?;
        match fs::create_dir(&install_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(self.already_installed(edition, install_dir));
            }
            Err(e) => return Err(Error::io("failed to create edition directory", &install_dir, e)),
        }
        let from = source_dir.clone();
        let to = install_dir.clone();
        let copied = tokio::task::spawn_blocking(move || copy_tree(&from, &to))
            .await
            .map_err(|e| Error::Other(e.into()))??;
        debug!(edition = %edition, files = copied, "copied source tree");
        remove_file_if_exists(&self.removed_marker(edition))?;
        transition(edition, EditionState::Extracted, EditionState::SourceInstalled);

        // 4. Build
        self.driver.configure(&install_dir).await?;
        self.driver
            .build_targets(&install_dir, &self.config.build.targets)
            .await?;
        let marker = install_dir.join(BUILD_MARKER);
        fs::write(&marker, self.config.build.targets.join("\n"))
            .map_err(|e| Error::io("failed to write build marker", &marker, e))?;
        transition(edition, EditionState::SourceInstalled, EditionState::Built);

        info!(edition = %edition, "installed into {}", install_dir.display());
        Ok(InstallOutcome {
            edition: edition.clone(),
            install_dir,
            reused_archive,
        })
    }

    /// Make an installed edition the active one.
    pub async fn activate(&self, edition: &EditionId) -> Result<ActivationReport> {
        self.require_installed(edition)?;
        let from = self.state(edition)?;

        let bin_dir = self
            .paths
            .edition_bin_dir(edition, &self.config.build.bin_dir);
        let report = self.activator().activate(edition, &bin_dir).await?;

        transition(edition, from, EditionState::Active);
        Ok(report)
    }

    /// Delete an edition's install directory.
    ///
    /// Removing an edition that was already removed succeeds again, so an
    /// interrupted remove can simply be repeated. Editions that were never
    /// installed are rejected.
    pub async fn remove(&self, edition: &EditionId) -> Result<RemoveOutcome> {
        let installed = self.installed()?;
        let marker = self.removed_marker(edition);
        if !installed.contains(edition) && !marker.is_file() {
            return Err(Error::unknown_edition(
                edition.as_str(),
                installed.iter().map(|e| e.to_string()).collect(),
            ));
        }

        let from = self.state(edition)?;
        let was_active = from == EditionState::Active;

        let dir = self.paths.edition_dir(edition);
        let removed = tokio::task::spawn_blocking(move || remove_tree(&dir))
            .await
            .map_err(|e| Error::Other(e.into()))??;
        if !removed {
            debug!(edition = %edition, "edition directory already absent");
        }
        if let Some(parent) = marker.parent() {
            create_dir_all(parent, "failed to record removal")?;
        }
        fs::write(&marker, "").map_err(|e| Error::io("failed to record removal", &marker, e))?;

        let deactivated = if was_active {
            let cleared = self.activator().clear()?;
            info!(edition = %edition, entries = cleared, "cleared active-use directory");
            true
        } else {
            false
        };

        transition(edition, from, EditionState::Removed);
        Ok(RemoveOutcome {
            removed,
            deactivated,
        })
    }
}

fn create_dir_all(path: &Path, message: &str) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::io(message, path, e))
}
