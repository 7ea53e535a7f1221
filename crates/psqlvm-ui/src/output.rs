//! Output formatting for the psqlvm CLI.

use crate::printer::Printer;
use crate::spinner::{Progress, Spinner};
use crate::style::Style;
use psqlvm_core::error::{Error, Fix};
use psqlvm_core::{OutputLine, StreamSource};
use std::io::{self, Write};

/// Output handler for consistent CLI output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    printer: Printer,
}

impl Output {
    /// Create an output handler for the given printer.
    pub fn new(printer: Printer) -> Self {
        Self { printer }
    }

    /// Get the printer this output writes through.
    pub fn printer(&self) -> Printer {
        self.printer
    }

    /// Check if verbose output is enabled.
    pub fn is_verbose(&self) -> bool {
        self.printer.is_verbose()
    }

    /// Print a status message with a step title.
    pub fn status(&self, action: &str, message: &str) {
        if self.printer.stdout_enabled() {
            eprintln!("{:>12} {}", Style::bold(Style::success(action)), message);
        }
    }

    /// Print a status message tagged with an edition.
    pub fn edition_status(&self, edition: &str, message: &str) {
        if self.printer.stdout_enabled() {
            eprintln!("{} {}", Style::edition(format!("[{}]", edition)), message);
        }
    }

    /// Print an info message.
    pub fn info(&self, message: &str) {
        if self.printer.stdout_enabled() {
            eprintln!("{}", message);
        }
    }

    /// Print a warning message.
    pub fn warn(&self, message: &str) {
        if self.printer.stderr_enabled() {
            eprintln!("{}: {}", Style::warning("warning"), message);
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        if self.printer.stderr_enabled() {
            eprintln!("{}: {}", Style::error("error"), message);
        }
    }

    /// Print verbose output (only shown in verbose mode).
    pub fn verbose(&self, message: &str) {
        if self.printer.is_verbose() {
            eprintln!("{}", Style::dim(message));
        }
    }

    /// Forward one line of child process output to the matching stream.
    pub fn child_line(&self, line: &OutputLine) {
        if !self.printer.stdout_enabled() {
            return;
        }
        match line.source {
            StreamSource::Stdout => println!("{}", line.line),
            StreamSource::Stderr => eprintln!("{}", line.line),
        }
    }

    /// Write a machine-readable line to stdout.
    pub fn println(&self, message: &str) {
        if self.printer.stderr_enabled() {
            println!("{}", message);
        }
    }

    /// Start a spinner that respects the current printer.
    pub fn spinner(&self, message: impl Into<String>) -> Spinner {
        Spinner::with_printer(self.printer, message)
    }

    /// Start a progress bar that respects the current printer.
    pub fn progress(&self, total: u64, message: impl Into<String>) -> Progress {
        Progress::with_printer(self.printer, total, message)
    }

    /// Print a structured error with fixes.
    pub fn print_error(&self, error: &Error) {
        if !self.printer.stderr_enabled() {
            return;
        }
        eprintln!();
        eprintln!("{}: {}", Style::error("error"), error);

        // Print context if available
        match error {
            Error::Config { path: Some(p), .. }
            | Error::Io { path: Some(p), .. }
            | Error::AlreadyInstalled { path: p, .. } => {
                eprintln!("  {} {}", Style::dim("-->"), p.display());
            }
            Error::Build {
                exit_code,
                source_dir,
                ..
            } => {
                if let Some(code) = exit_code {
                    eprintln!("  {} {}", Style::dim("exit code:"), code);
                }
                eprintln!("  {} {}", Style::dim("source:"), source_dir.display());
            }
            Error::Transport { source, .. } => {
                eprintln!("  {} {}", Style::dim("cause:"), source);
            }
            Error::Extraction { source, .. } => {
                eprintln!("  {} {}", Style::dim("cause:"), source);
            }
            _ => {}
        }

        let fixes = error.fixes();
        if !fixes.is_empty() {
            eprintln!();
            for fix in fixes {
                self.print_fix(fix);
            }
        }
    }

    /// Print a fix suggestion.
    pub fn print_fix(&self, fix: &Fix) {
        if let Some(ref cmd) = fix.command {
            eprintln!("{}: Run `{}`", Style::info("fix"), Style::command(cmd));
            if fix.description != *cmd {
                eprintln!("      {}", Style::dim(&fix.description));
            }
        } else {
            eprintln!("{}: {}", Style::info("fix"), fix.description);
        }
    }

    /// Print a section header.
    pub fn header(&self, title: &str) {
        if self.printer.stdout_enabled() {
            eprintln!();
            eprintln!("{}", Style::bold(title));
        }
    }

    /// Print a list item.
    pub fn list_item(&self, key: &str, value: &str) {
        if self.printer.stdout_enabled() {
            eprintln!("  {}: {}", Style::dim(key), value);
        }
    }

    /// Print a success summary with duration.
    pub fn success_summary(&self, action: &str, duration: std::time::Duration) {
        if self.printer.stdout_enabled() {
            eprintln!(
                "{} {} {}",
                Style::success("✓"),
                action,
                Style::dim(format!("({})", Style::duration(duration)))
            );
        }
    }

    /// Flush stdout.
    pub fn flush(&self) {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
    }
}
