//! Loading `config.toml`.
//!
//! The config file lives at `~/.config/psqlvm/config.toml` (or the platform
//! equivalent) unless `--config-file`/`PSQLVM_CONFIG_FILE` points elsewhere.

use crate::config::ConfigFile;
use directories::ProjectDirs;
use psqlvm_core::{Error, Fix};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Error type for config operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("failed to write config {}: {source}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::ReadError { path, .. }
            | ConfigError::ParseError { path, .. }
            | ConfigError::WriteError { path, .. }
            | ConfigError::NotFound(path) => Some(path.as_path()),
            ConfigError::SerializeError(_) | ConfigError::Invalid(_) => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        let fixes = match &err {
            ConfigError::NotFound(_) => vec![Fix::new(
                "Create the file or drop --config-file / PSQLVM_CONFIG_FILE",
            )],
            ConfigError::ParseError { .. } | ConfigError::Invalid(_) => {
                vec![Fix::with_command(
                    "Inspect the effective configuration",
                    "psqlvm config show",
                )]
            }
            _ => vec![],
        };
        Error::Config {
            message: err.to_string(),
            path: err.path().map(Path::to_path_buf),
            source: Some(Box::new(err)),
            fixes,
        }
    }
}

impl ConfigFile {
    /// Parse a config layer from a TOML string.
    pub fn parse(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Parse a config layer from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Serialize the layer to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the layer to a file, creating parent directories.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let write_err = |source| ConfigError::WriteError {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(write_err)?;
        Ok(())
    }
}

/// Get the default config file path.
///
/// - Linux: `~/.config/psqlvm/config.toml`
/// - macOS: `~/Library/Application Support/psqlvm/config.toml`
/// - Windows: `%APPDATA%\psqlvm\config\config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "psqlvm", psqlvm_core::PRODUCT)
        .map(|dirs| dirs.config_dir().join(crate::CONFIG_FILENAME))
}

/// Load a config layer.
///
/// An explicit path must exist. The default path is optional and yields
/// `Ok(None)` when absent.
pub fn load_config(explicit: Option<&Path>) -> Result<Option<(PathBuf, ConfigFile)>, ConfigError> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => {
                debug!("Could not determine default config path");
                return Ok(None);
            }
        },
    };

    if !path.exists() {
        if required {
            return Err(ConfigError::NotFound(path));
        }
        debug!("Config file does not exist: {}", path.display());
        return Ok(None);
    }

    debug!("Loading config from: {}", path.display());
    let layer = ConfigFile::from_file(&path)?;
    Ok(Some((path, layer)))
}
