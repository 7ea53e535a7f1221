//! Configuration merging utilities.
//!
//! This module provides the `Combine` trait for merging configuration from
//! multiple sources:
//!
//! - `Option<T>`: first `Some` value wins
//! - Arrays: merged with higher precedence items placed earlier
//!
//! Lists that replace rather than extend (build targets, configure
//! arguments) are stored as `Option<Vec<_>>` and so follow the `Option` rule.

use crate::config::{ActivationSection, BuildSection, CatalogSection, ConfigFile, SourceSection};

/// Trait for combining configuration values.
///
/// The convention is that `self` has higher precedence than `other`.
pub trait Combine {
    /// Combine two values, preferring values in `self`.
    #[must_use]
    fn combine(self, other: Self) -> Self;
}

// ─── Option<T> ───────────────────────────────────────────────────────────────

impl<T> Combine for Option<T> {
    fn combine(self, other: Self) -> Self {
        self.or(other)
    }
}

// ─── Vec<T> ──────────────────────────────────────────────────────────────────

impl<T: PartialEq> Combine for Vec<T> {
    fn combine(mut self, other: Self) -> Self {
        for item in other {
            if !self.contains(&item) {
                self.push(item);
            }
        }
        self
    }
}

// ─── ConfigFile ──────────────────────────────────────────────────────────────

impl Combine for ConfigFile {
    fn combine(self, other: Self) -> Self {
        Self {
            source: self.source.combine(other.source),
            build: self.build.combine(other.build),
            activation: self.activation.combine(other.activation),
            catalog: self.catalog.combine(other.catalog),
        }
    }
}

impl Combine for SourceSection {
    fn combine(self, other: Self) -> Self {
        Self {
            base_url: self.base_url.combine(other.base_url),
            timeout_secs: self.timeout_secs.combine(other.timeout_secs),
        }
    }
}

impl Combine for BuildSection {
    fn combine(self, other: Self) -> Self {
        Self {
            targets: self.targets.combine(other.targets),
            configure_args: self.configure_args.combine(other.configure_args),
            make: self.make.combine(other.make),
            bin_dir: self.bin_dir.combine(other.bin_dir),
        }
    }
}

impl Combine for ActivationSection {
    fn combine(self, other: Self) -> Self {
        Self {
            mode: self.mode.combine(other.mode),
            executables_only: self.executables_only.combine(other.executables_only),
        }
    }
}

impl Combine for CatalogSection {
    fn combine(self, other: Self) -> Self {
        Self {
            editions: self.editions.combine(other.editions),
        }
    }
}
