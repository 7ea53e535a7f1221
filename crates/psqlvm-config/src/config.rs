//! `config.toml` model.
//!
//! The file form ([`ConfigFile`]) has every field optional so that several
//! layers (CLI flags, environment, file) can be merged with
//! [`Combine`](crate::Combine) before defaults are applied by
//! [`ConfigFile::resolve`].

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::load::ConfigError;

/// Default location of PostgreSQL source releases.
pub const DEFAULT_SOURCE_URL: &str = "https://ftp.postgresql.org/pub/source";

/// Default download timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Default build targets, run in order with `make -C <target>`.
pub const DEFAULT_BUILD_TARGETS: &[&str] = &["src/bin", "src/include", "src/interfaces"];

/// Default directory, relative to an edition's install dir, that holds built binaries.
pub const DEFAULT_BIN_DIR: &str = "src/bin";

/// How the active-use directory is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationMode {
    /// Symbolic links into the edition's build tree.
    #[default]
    Symlink,
    /// Plain copies into the legacy flat `~/.psqlvm` directory.
    Copy,
}

impl ActivationMode {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivationMode::Symlink => "symlink",
            ActivationMode::Copy => "copy",
        }
    }
}

impl std::fmt::Display for ActivationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `[source]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SourceSection {
    /// Base URL; archives live at `<base-url>/v<edition>/postgresql-<edition>.tar.gz`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// HTTP timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// `[build]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildSection {
    /// Ordered `make -C` targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<String>>,
    /// Extra arguments for `./configure`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configure_args: Option<Vec<String>>,
    /// Make program.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    /// Directory scanned for binaries on activation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin_dir: Option<String>,
}

/// `[activation]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ActivationSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ActivationMode>,
    /// Only expose files with an executable bit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executables_only: Option<bool>,
}

/// `[catalog]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    /// Editions accepted in addition to the built-in list.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub editions: Vec<String>,
}

/// One configuration layer as written in `config.toml`.
///
/// # Example
///
/// ```toml
/// [source]
/// base-url = "https://ftp.postgresql.org/pub/source"
///
/// [build]
/// targets = ["src/bin", "src/include", "src/interfaces"]
/// configure-args = ["--without-icu"]
///
/// [activation]
/// mode = "symlink"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub source: SourceSection,
    pub build: BuildSection,
    pub activation: ActivationSection,
    pub catalog: CatalogSection,
}

/// Fully resolved source settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub base_url: String,
    pub timeout: Duration,
}

/// Fully resolved build settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub targets: Vec<String>,
    pub configure_args: Vec<String>,
    pub make: String,
    pub bin_dir: String,
}

/// Fully resolved activation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationConfig {
    pub mode: ActivationMode,
    pub executables_only: bool,
}

/// Effective configuration after layering and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source: SourceConfig,
    pub build: BuildConfig,
    pub activation: ActivationConfig,
    pub extra_editions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        ConfigFile::default()
            .resolve()
            .expect("default configuration is valid")
    }
}

impl ConfigFile {
    /// Apply defaults and validate.
    pub fn resolve(self) -> Result<Config, ConfigError> {
        let base_url = self
            .source
            .base_url
            .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string());
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "source base-url must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let timeout_secs = self.source.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "source timeout-secs must be greater than zero".into(),
            ));
        }

        let targets = self.build.targets.unwrap_or_else(|| {
            DEFAULT_BUILD_TARGETS
                .iter()
                .map(|t| t.to_string())
                .collect()
        });
        if let Some(bad) = targets.iter().find(|t| t.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "build targets must not be empty strings: {:?}",
                bad
            )));
        }

        let bin_dir = self
            .build
            .bin_dir
            .unwrap_or_else(|| DEFAULT_BIN_DIR.to_string());
        if bin_dir.is_empty() || std::path::Path::new(&bin_dir).is_absolute() {
            return Err(ConfigError::Invalid(format!(
                "build bin-dir must be a relative path, got '{}'",
                bin_dir
            )));
        }

        Ok(Config {
            source: SourceConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            build: BuildConfig {
                targets,
                configure_args: self.build.configure_args.unwrap_or_default(),
                make: self.build.make.unwrap_or_else(|| "make".to_string()),
                bin_dir,
            },
            activation: ActivationConfig {
                mode: self.activation.mode.unwrap_or_default(),
                executables_only: self.activation.executables_only.unwrap_or(false),
            },
            extra_editions: self.catalog.editions,
        })
    }
}

impl Config {
    /// Render the effective configuration back into file form.
    pub fn to_file_layer(&self) -> ConfigFile {
        ConfigFile {
            source: SourceSection {
                base_url: Some(self.source.base_url.clone()),
                timeout_secs: Some(self.source.timeout.as_secs()),
            },
            build: BuildSection {
                targets: Some(self.build.targets.clone()),
                configure_args: Some(self.build.configure_args.clone()),
                make: Some(self.build.make.clone()),
                bin_dir: Some(self.build.bin_dir.clone()),
            },
            activation: ActivationSection {
                mode: Some(self.activation.mode),
                executables_only: Some(self.activation.executables_only),
            },
            catalog: CatalogSection {
                editions: self.extra_editions.clone(),
            },
        }
    }
}
