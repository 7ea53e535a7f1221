//! Error types for psqlvm.

use std::path::PathBuf;

use crate::ExitCode;

/// Result type alias using psqlvm Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Error codes for categorizing failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Archive could not be downloaded
    DownloadFailed,
    /// Archive could not be unpacked
    ExtractionFailed,
    /// configure or make exited non-zero
    BuildFailure,
    /// Edition directory already present
    AlreadyInstalled,
    /// Edition is not known or not installed
    UnknownEdition,
    /// Invalid configuration
    ConfigError,
    /// I/O or traversal error
    IoError,
    /// External tool is not on PATH
    ToolMissing,
    /// Interactive prompt could not be shown
    PromptFailed,
}

impl ErrorCode {
    /// Map the error category to a process exit code.
    pub fn exit_code(self) -> ExitCode {
        match self {
            ErrorCode::DownloadFailed => ExitCode::DownloadError,
            ErrorCode::ExtractionFailed | ErrorCode::BuildFailure => ExitCode::BuildError,
            ErrorCode::AlreadyInstalled | ErrorCode::UnknownEdition => ExitCode::EditionError,
            ErrorCode::ConfigError => ExitCode::ConfigError,
            ErrorCode::PromptFailed => ExitCode::UsageError,
            ErrorCode::IoError | ErrorCode::ToolMissing => ExitCode::GeneralError,
        }
    }
}

/// A fix suggestion for an error.
#[derive(Debug, Clone)]
pub struct Fix {
    /// Description of what this fix does
    pub description: String,
    /// Command to run, if applicable
    pub command: Option<String>,
}

impl Fix {
    /// Create a fix with just a description.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            command: None,
        }
    }

    /// Create a fix with a command.
    pub fn with_command(description: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            command: Some(command.into()),
        }
    }
}

/// Structured error type for psqlvm.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("download of {url} failed with HTTP {status}")]
    Download {
        url: String,
        status: u16,
        fixes: Vec<Fix>,
    },

    #[error("could not reach {url}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to extract {}", archive.display())]
    Extraction {
        archive: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("build of `{target}` failed")]
    Build {
        target: String,
        exit_code: Option<i32>,
        source_dir: PathBuf,
        fixes: Vec<Fix>,
    },

    #[error("edition {edition} is already installed")]
    AlreadyInstalled {
        edition: String,
        path: PathBuf,
        fixes: Vec<Fix>,
    },

    #[error("unknown edition '{edition}'")]
    UnknownEdition {
        edition: String,
        known: Vec<String>,
        fixes: Vec<Fix>,
    },

    #[error("configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        fixes: Vec<Fix>,
    },

    #[error("I/O error: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    #[error("tool not found: {tool}")]
    ToolMissing {
        tool: String,
        #[source]
        source: std::io::Error,
        fixes: Vec<Fix>,
    },

    #[error("prompt failed: {message}")]
    Prompt { message: String, fixes: Vec<Fix> },

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Get the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Download { .. } | Error::Transport { .. } => ErrorCode::DownloadFailed,
            Error::Extraction { .. } => ErrorCode::ExtractionFailed,
            Error::Build { .. } => ErrorCode::BuildFailure,
            Error::AlreadyInstalled { .. } => ErrorCode::AlreadyInstalled,
            Error::UnknownEdition { .. } => ErrorCode::UnknownEdition,
            Error::Config { .. } => ErrorCode::ConfigError,
            Error::Io { .. } | Error::Other(_) => ErrorCode::IoError,
            Error::ToolMissing { .. } => ErrorCode::ToolMissing,
            Error::Prompt { .. } => ErrorCode::PromptFailed,
        }
    }

    /// Get suggested fixes for this error.
    pub fn fixes(&self) -> &[Fix] {
        match self {
            Error::Download { fixes, .. } => fixes,
            Error::Build { fixes, .. } => fixes,
            Error::AlreadyInstalled { fixes, .. } => fixes,
            Error::UnknownEdition { fixes, .. } => fixes,
            Error::Config { fixes, .. } => fixes,
            Error::ToolMissing { fixes, .. } => fixes,
            Error::Prompt { fixes, .. } => fixes,
            Error::Transport { .. } | Error::Extraction { .. } | Error::Io { .. } | Error::Other(_) => {
                &[]
            }
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            path: None,
            source: None,
            fixes: vec![],
        }
    }

    /// Create an I/O error tied to a path.
    pub fn io(message: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            message: message.into(),
            path: Some(path.into()),
            source,
        }
    }

    /// Create an unknown-edition error listing the editions that would have been accepted.
    pub fn unknown_edition(edition: impl Into<String>, known: Vec<String>) -> Self {
        let edition = edition.into();
        let fixes = if known.is_empty() {
            vec![Fix::with_command(
                "Install an edition first",
                "psqlvm install",
            )]
        } else {
            vec![Fix::new(format!("Choose one of: {}", known.join(", ")))]
        };
        Error::UnknownEdition {
            edition,
            known,
            fixes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_map_to_exit_codes() {
        let err = Error::Download {
            url: "https://example.invalid/x.tar.gz".into(),
            status: 404,
            fixes: vec![],
        };
        assert_eq!(err.code(), ErrorCode::DownloadFailed);
        assert_eq!(err.code().exit_code(), ExitCode::DownloadError);

        let err = Error::config("bad");
        assert_eq!(err.code().exit_code(), ExitCode::ConfigError);
    }

    #[test]
    fn test_unknown_edition_fixes() {
        let err = Error::unknown_edition("99.9", vec![]);
        assert_eq!(err.fixes().len(), 1);
        assert_eq!(err.fixes()[0].command.as_deref(), Some("psqlvm install"));

        let err = Error::unknown_edition("99.9", vec!["14.2".into(), "15.1".into()]);
        assert!(err.fixes()[0].description.contains("14.2, 15.1"));
        assert_eq!(err.to_string(), "unknown edition '99.9'");
    }

    #[test]
    fn test_download_error_message() {
        let err = Error::Download {
            url: "https://ftp.postgresql.org/pub/source/v1.0/postgresql-1.0.tar.gz".into(),
            status: 404,
            fixes: vec![],
        };
        assert!(err.to_string().contains("HTTP 404"));
    }
}
