//! Known PostgreSQL editions.

use crate::lifecycle::REMOVED_DIR;
use psqlvm_config::{ACTIVE_DIR_NAME, Config};
use psqlvm_core::{EditionId, Error, Result};

/// Release tags that can be installed.
///
/// This list is updated with each psqlvm release. Extra editions can be
/// added through the `[catalog]` section of the config file.
pub static KNOWN_EDITIONS: &[&str] = &[
    // 17.x
    "17.2", "17.1", "17.0", // 16.x
    "16.6", "16.5", "16.4", "16.3", "16.2", "16.1", "16.0", // 15.x
    "15.10", "15.9", "15.8", "15.7", "15.6", "15.5", "15.4", "15.3", "15.2", "15.1", "15.0",
    // 14.x
    "14.15", "14.14", "14.13", "14.12", "14.11", "14.10", "14.9", "14.8", "14.7", "14.6", "14.5",
    "14.4", "14.3", "14.2", "14.1", "14.0", // 13.x
    "13.18", "13.17", "13.16", "13.15", "13.14", "13.13", "13.12", // 12.x
    "12.22", "12.21", "12.20",
];

/// Install-root entries that can never name an edition.
const RESERVED_NAMES: &[&str] = &[ACTIVE_DIR_NAME, REMOVED_DIR];

/// The edition suggested when nothing else is specified.
pub static RECOMMENDED_EDITION: &str = "16.6";

/// The set of editions that may be installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    editions: Vec<EditionId>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// The built-in catalog.
    pub fn builtin() -> Self {
        Self::from_ids(
            KNOWN_EDITIONS
                .iter()
                .filter_map(|tag| EditionId::new(*tag).ok())
                .collect(),
        )
    }

    /// The built-in catalog plus extra release tags.
    pub fn with_extra<I, S>(extra: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut editions = Self::builtin().editions;
        for tag in extra {
            let tag = tag.as_ref();
            let id: EditionId = tag.parse().map_err(|e| {
                Error::config(format!("invalid edition '{}' in [catalog]: {}", tag, e))
            })?;
            if RESERVED_NAMES.contains(&id.as_str()) {
                return Err(Error::config(format!(
                    "'{}' in [catalog] is reserved for psqlvm's own directories",
                    tag
                )));
            }
            editions.push(id);
        }
        Ok(Self::from_ids(editions))
    }

    /// Catalog for an effective configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_extra(&config.extra_editions)
    }

    fn from_ids(mut editions: Vec<EditionId>) -> Self {
        editions.sort_by(|a, b| b.cmp(a));
        editions.dedup();
        Self { editions }
    }

    /// Editions, newest first.
    pub fn editions(&self) -> &[EditionId] {
        &self.editions
    }

    /// Edition names, newest first.
    pub fn names(&self) -> Vec<String> {
        self.editions.iter().map(|e| e.to_string()).collect()
    }

    /// Check if an edition is in the catalog.
    pub fn contains(&self, edition: &EditionId) -> bool {
        self.editions.contains(edition)
    }

    /// Check if a directory or argument name is a catalog edition.
    pub fn contains_name(&self, name: &str) -> bool {
        self.editions.iter().any(|e| e == name)
    }

    /// Parse a user-supplied edition and require it to be in the catalog.
    pub fn resolve(&self, name: &str) -> Result<EditionId> {
        match name.parse::<EditionId>() {
            Ok(id) if self.contains(&id) => Ok(id),
            _ => Err(Error::unknown_edition(name.trim(), self.names())),
        }
    }

    /// The recommended edition.
    pub fn recommended(&self) -> Option<&EditionId> {
        self.editions.iter().find(|e| *e == RECOMMENDED_EDITION)
    }
}
