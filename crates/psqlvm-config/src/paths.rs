//! Well-known directories.
//!
//! Every directory psqlvm touches is derived from one home directory:
//!
//! | path | purpose |
//! |------|---------|
//! | `<home>/.local/bin/psqlvm/<edition>/` | installed source tree of one edition |
//! | `<home>/.local/bin/psqlvm/current/` | active-use directory (symlink mode) |
//! | `<home>/.psqlvm/` | active-use directory (copy mode) |
//! | `<home>/Downloads/` | archives and extracted sources |
//!
//! Nothing here touches the filesystem; callers create directories before
//! use.

use crate::config::ActivationMode;
use directories::BaseDirs;
use psqlvm_core::{EditionId, EnvVars, PRODUCT};
use std::path::{Path, PathBuf};

/// Name of the packaged software, used in archive names.
pub const PACKAGE: &str = "postgresql";

/// Name of the active-use directory inside the install root.
pub const ACTIVE_DIR_NAME: &str = "current";

/// Resolve the home directory.
///
/// Checks `PSQLVM_HOME`, `HOME`, `USERPROFILE`, then the platform home
/// directory, and finally falls back to `~`.
pub fn resolve_home<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    [EnvVars::PSQLVM_HOME, EnvVars::HOME, EnvVars::USERPROFILE]
        .into_iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("~"))
}

/// All directories derived from a home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    home: PathBuf,
    install_root: PathBuf,
    download_dir: PathBuf,
}

impl Paths {
    /// Derive paths from a home directory.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            install_root: home.join(".local").join("bin").join(PRODUCT),
            download_dir: home.join("Downloads"),
            home,
        }
    }

    /// The home directory everything is derived from.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Directory holding one subdirectory per installed edition.
    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    /// Download cache for archives and extracted sources.
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Install directory of one edition.
    pub fn edition_dir(&self, edition: &EditionId) -> PathBuf {
        self.install_root.join(edition.as_str())
    }

    /// Directory scanned for binaries when activating an edition.
    pub fn edition_bin_dir(&self, edition: &EditionId, bin_dir: &str) -> PathBuf {
        self.edition_dir(edition).join(bin_dir)
    }

    /// Active-use directory for symlink activation.
    pub fn active_dir(&self) -> PathBuf {
        self.install_root.join(ACTIVE_DIR_NAME)
    }

    /// Legacy flat active-use directory for copy activation.
    pub fn legacy_active_dir(&self) -> PathBuf {
        self.home.join(format!(".{}", PRODUCT))
    }

    /// Active-use directory for the given activation mode.
    pub fn active_dir_for(&self, mode: ActivationMode) -> PathBuf {
        match mode {
            ActivationMode::Symlink => self.active_dir(),
            ActivationMode::Copy => self.legacy_active_dir(),
        }
    }

    /// File name of an edition's source archive.
    pub fn archive_file_name(edition: &EditionId) -> String {
        format!("{}-{}.tar.gz", PACKAGE, edition)
    }

    /// Cached archive location.
    pub fn archive_path(&self, edition: &EditionId) -> PathBuf {
        self.download_dir.join(Self::archive_file_name(edition))
    }

    /// Directory the archive unpacks into.
    pub fn extracted_source_dir(&self, edition: &EditionId) -> PathBuf {
        self.download_dir.join(format!("{}-{}", PACKAGE, edition))
    }
}

/// Download URL for an edition's source archive.
pub fn archive_url(base_url: &str, edition: &EditionId) -> String {
    format!(
        "{}/v{}/{}",
        base_url.trim_end_matches('/'),
        edition,
        Paths::archive_file_name(edition)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn edition(s: &str) -> EditionId {
        s.parse().unwrap()
    }

    #[test]
    fn test_layout() {
        let paths = Paths::new("/home/pg");
        let e = edition("14.2");

        assert_eq!(paths.install_root(), Path::new("/home/pg/.local/bin/psqlvm"));
        assert_eq!(paths.download_dir(), Path::new("/home/pg/Downloads"));
        assert_eq!(
            paths.edition_dir(&e),
            PathBuf::from("/home/pg/.local/bin/psqlvm/14.2")
        );
        assert_eq!(
            paths.edition_bin_dir(&e, "src/bin"),
            PathBuf::from("/home/pg/.local/bin/psqlvm/14.2/src/bin")
        );
        assert_eq!(
            paths.active_dir(),
            PathBuf::from("/home/pg/.local/bin/psqlvm/current")
        );
        assert_eq!(paths.legacy_active_dir(), PathBuf::from("/home/pg/.psqlvm"));
        assert_eq!(
            paths.archive_path(&e),
            PathBuf::from("/home/pg/Downloads/postgresql-14.2.tar.gz")
        );
        assert_eq!(
            paths.extracted_source_dir(&e),
            PathBuf::from("/home/pg/Downloads/postgresql-14.2")
        );
    }

    #[test]
    fn test_active_dir_for_mode() {
        let paths = Paths::new("/h");
        assert_eq!(paths.active_dir_for(ActivationMode::Symlink), paths.active_dir());
        assert_eq!(
            paths.active_dir_for(ActivationMode::Copy),
            paths.legacy_active_dir()
        );
    }

    #[test]
    fn test_archive_url() {
        let e = edition("15.1");
        assert_eq!(
            archive_url("https://ftp.postgresql.org/pub/source", &e),
            "https://ftp.postgresql.org/pub/source/v15.1/postgresql-15.1.tar.gz"
        );
        assert_eq!(
            archive_url("http://mirror.local/", &e),
            "http://mirror.local/v15.1/postgresql-15.1.tar.gz"
        );
    }

    #[test]
    fn test_resolve_home_precedence() {
        let env: HashMap<&str, &str> = [
            ("PSQLVM_HOME", "/override"),
            ("HOME", "/home/user"),
            ("USERPROFILE", "C:\\Users\\user"),
        ]
        .into_iter()
        .collect();
        let lookup = |k: &str| env.get(k).map(|v| v.to_string());
        assert_eq!(resolve_home(lookup), PathBuf::from("/override"));

        let lookup = |k: &str| match k {
            "HOME" => Some("/home/user".to_string()),
            _ => None,
        };
        assert_eq!(resolve_home(lookup), PathBuf::from("/home/user"));

        let lookup = |k: &str| match k {
            "HOME" => Some("  ".to_string()),
            "USERPROFILE" => Some("/profile".to_string()),
            _ => None,
        };
        assert_eq!(resolve_home(lookup), PathBuf::from("/profile"));
    }

    #[test]
    fn test_resolve_home_falls_back() {
        let home = resolve_home(|_| None);
        assert!(!home.as_os_str().is_empty());
    }
}
