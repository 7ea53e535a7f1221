//! Configuration and path resolution for psqlvm.
//!
//! This crate handles:
//! - Deriving the install root, download cache and active-use directory
//! - Parsing `config.toml`
//! - Layering CLI, environment and file configuration

pub mod combine;
pub mod config;
pub mod load;
pub mod paths;

pub use combine::Combine;
pub use config::{
    ActivationConfig, ActivationMode, ActivationSection, BuildConfig, BuildSection,
    CatalogSection, Config, ConfigFile, SourceConfig, SourceSection,
};
pub use load::{ConfigError, default_config_path, load_config};
pub use paths::{ACTIVE_DIR_NAME, PACKAGE, Paths, archive_url, resolve_home};

use psqlvm_core::EnvVars;
use std::path::PathBuf;

/// The config filename.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Overrides supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Home directory override.
    pub home: Option<PathBuf>,
    /// Explicit config file.
    pub config_file: Option<PathBuf>,
    /// Source base URL override.
    pub source_url: Option<String>,
}

/// Process-wide settings, built once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Settings {
    pub paths: Paths,
    pub config: Config,
    /// The config file that was read, if any.
    pub config_file: Option<PathBuf>,
}

impl Settings {
    /// Build settings from CLI overrides, the process environment and the config file.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        Self::load_with(options, |key| std::env::var(key).ok())
    }

    /// Build settings using a custom environment lookup.
    pub fn load_with<F>(options: LoadOptions, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let home = options.home.clone().unwrap_or_else(|| resolve_home(&lookup));
        // Link targets are derived from the home; they must not depend on
        // where the process was started.
        let home = std::path::absolute(&home).map_err(|e| {
            ConfigError::Invalid(format!(
                "cannot resolve home directory {}: {}",
                home.display(),
                e
            ))
        })?;

        let explicit = options
            .config_file
            .clone()
            .or_else(|| lookup(EnvVars::PSQLVM_CONFIG_FILE).map(PathBuf::from));
        let (config_file, file_layer) = match load_config(explicit.as_deref())? {
            Some((path, layer)) => (Some(path), layer),
            None => (None, ConfigFile::default()),
        };

        let cli_layer = ConfigFile {
            source: SourceSection {
                base_url: options.source_url,
                ..Default::default()
            },
            ..Default::default()
        };
        let env_layer = ConfigFile {
            source: SourceSection {
                base_url: lookup(EnvVars::PSQLVM_SOURCE_URL),
                ..Default::default()
            },
            ..Default::default()
        };

        let config = cli_layer.combine(env_layer).combine(file_layer).resolve()?;

        Ok(Self {
            paths: Paths::new(home),
            config,
            config_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_layering_precedence() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "[source]\nbase-url = \"http://file.local\"\n[build]\nmake = \"gmake\"\n",
        )
        .unwrap();

        let env_url = "http://env.local".to_string();
        let lookup = |key: &str| match key {
            "PSQLVM_SOURCE_URL" => Some(env_url.clone()),
            _ => None,
        };

        let settings = Settings::load_with(
            LoadOptions {
                home: Some(dir.path().to_path_buf()),
                config_file: Some(config_path.clone()),
                source_url: None,
            },
            lookup,
        )
        .unwrap();
        assert_eq!(settings.config.source.base_url, "http://env.local");
        assert_eq!(settings.config.build.make, "gmake");
        assert_eq!(settings.config_file.as_deref(), Some(config_path.as_path()));
        assert_eq!(settings.paths.home(), dir.path());

        let settings = Settings::load_with(
            LoadOptions {
                home: Some(dir.path().to_path_buf()),
                config_file: Some(config_path),
                source_url: Some("https://cli.local".into()),
            },
            lookup,
        )
        .unwrap();
        assert_eq!(settings.config.source.base_url, "https://cli.local");
    }

    #[test]
    fn test_relative_home_is_made_absolute() {
        let settings = Settings::load_with(
            LoadOptions {
                home: Some(PathBuf::from("rel-home")),
                config_file: None,
                source_url: None,
            },
            |_| None,
        )
        .unwrap();
        let expected = std::env::current_dir().unwrap().join("rel-home");
        assert_eq!(settings.paths.home(), expected.as_path());
        assert!(settings.paths.install_root().is_absolute());
    }

    #[test]
    fn test_config_file_from_env() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom.toml");
        std::fs::write(&config_path, "[activation]\nmode = \"copy\"\n").unwrap();

        let path_str = config_path.to_string_lossy().to_string();
        let lookup = |key: &str| match key {
            "PSQLVM_CONFIG_FILE" => Some(path_str.clone()),
            "PSQLVM_HOME" => Some("/tmp/psqlvm-home".to_string()),
            _ => None,
        };
        let settings = Settings::load_with(LoadOptions::default(), lookup).unwrap();
        assert_eq!(settings.config.activation.mode, ActivationMode::Copy);
        assert_eq!(settings.paths.home(), std::path::Path::new("/tmp/psqlvm-home"));
    }
}
