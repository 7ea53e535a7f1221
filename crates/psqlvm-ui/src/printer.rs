//! Printer abstraction for controlling output verbosity.
//!
//! A `Printer` decides which output channels are live: status lines,
//! progress bars, and streamed build output.

use indicatif::ProgressDrawTarget;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Printer {
    /// Suppress all output.
    Silent,
    /// Suppress status and build output, keep errors.
    Quiet,
    /// Normal output (default).
    #[default]
    Normal,
    /// Normal output but exclude progress bars.
    NoProgress,
    /// Verbose output including debug messages.
    Verbose,
}

impl Printer {
    /// Create a printer from quiet/verbose flags.
    pub fn from_flags(quiet: u8, verbose: bool) -> Self {
        if quiet >= 2 {
            Self::Silent
        } else if quiet == 1 {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else if !console::Term::stderr().is_term() {
            Self::NoProgress
        } else {
            Self::Normal
        }
    }

    /// Get the progress bar draw target for this printer.
    pub fn target(self) -> ProgressDrawTarget {
        match self {
            Self::Silent | Self::Quiet | Self::Verbose | Self::NoProgress => {
                ProgressDrawTarget::hidden()
            }
            Self::Normal => ProgressDrawTarget::stderr(),
        }
    }

    /// Check if status and build output is enabled.
    pub fn stdout_enabled(self) -> bool {
        matches!(self, Self::Normal | Self::Verbose | Self::NoProgress)
    }

    /// Check if error output is enabled.
    pub fn stderr_enabled(self) -> bool {
        !matches!(self, Self::Silent)
    }

    /// Check if verbose output is enabled.
    pub fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags() {
        assert_eq!(Printer::from_flags(2, false), Printer::Silent);
        assert_eq!(Printer::from_flags(1, true), Printer::Quiet);
        assert_eq!(Printer::from_flags(0, true), Printer::Verbose);
    }

    #[test]
    fn test_channels() {
        assert!(!Printer::Quiet.stdout_enabled());
        assert!(Printer::Quiet.stderr_enabled());
        assert!(!Printer::Silent.stderr_enabled());
        assert!(Printer::NoProgress.stdout_enabled());
    }
}
