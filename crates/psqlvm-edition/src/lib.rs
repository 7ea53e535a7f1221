//! Edition management for psqlvm.
//!
//! This crate handles:
//! - The catalog of installable PostgreSQL editions
//! - Discovering installed editions
//! - Downloading, extracting and building source archives
//! - Activating an edition's binaries and removing editions

pub mod activate;
pub mod build;
pub mod catalog;
pub mod fetch;
pub mod fsutil;
pub mod lifecycle;
pub mod registry;
pub mod walker;

pub use activate::{ActivationReport, Activator, LinkFailure};
pub use build::{BuildDriver, LineHandler, NativeBuildDriver};
pub use catalog::{Catalog, KNOWN_EDITIONS, RECOMMENDED_EDITION};
pub use fetch::{ArchiveFetcher, HttpFetcher};
pub use lifecycle::{
    DefaultEditionManager, EditionManager, EditionState, InstallOptions, InstallOutcome,
    RemoveOutcome,
};
pub use registry::installed_editions;
pub use walker::{PathInfo, Walker, walk_files};
