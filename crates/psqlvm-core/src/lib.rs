//! Core types and orchestration for psqlvm.
//!
//! This crate provides shared types, error handling, and command execution
//! utilities used across all psqlvm crates.

pub mod command;
pub mod edition;
pub mod env;
pub mod error;

pub use command::{CommandOutput, CommandRunner, OutputLine, StreamSource};
pub use edition::{EditionId, EditionParseError};
pub use env::EnvVars;
pub use error::{Error, ErrorCode, Fix, Result};

/// The product name, used for directory names and the binary name.
pub const PRODUCT: &str = "psqlvm";

/// Exit codes for the psqlvm CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    GeneralError = 1,
    /// Usage error (bad arguments)
    UsageError = 2,
    /// Configuration error
    ConfigError = 3,
    /// Edition unknown or already installed
    EditionError = 4,
    /// Extraction, configure or make failure
    BuildError = 5,
    /// Archive download failure
    DownloadError = 6,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}
