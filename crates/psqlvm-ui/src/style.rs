//! Styling utilities for terminal output.

use console::{StyledObject, style};

/// Style helper for consistent terminal output.
pub struct Style;

impl Style {
    /// Style text as an error (red).
    pub fn error<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).red().bold()
    }

    /// Style text as a warning (yellow).
    pub fn warning<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).yellow()
    }

    /// Style text as success (green).
    pub fn success<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).green()
    }

    /// Style text as info (cyan).
    pub fn info<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).cyan()
    }

    /// Style text as a command hint (cyan, bold).
    pub fn command<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).cyan().bold()
    }

    /// Style text as dim (for secondary info).
    pub fn dim<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).dim()
    }

    /// Style an edition identifier (blue, bold).
    pub fn edition<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).blue().bold()
    }

    /// Style text as bold.
    pub fn bold<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).bold()
    }

    /// Style a duration in human-readable format.
    pub fn duration(duration: std::time::Duration) -> String {
        let secs = duration.as_secs_f64();
        if secs < 1.0 {
            format!("{:.0}ms", duration.as_millis())
        } else if secs < 60.0 {
            format!("{:.1}s", secs)
        } else {
            let mins = secs / 60.0;
            format!("{:.1}m", mins)
        }
    }
}

/// Check if colors should be used based on environment and flags.
pub fn colors_enabled(no_color_flag: bool) -> bool {
    if no_color_flag || psqlvm_core::env::no_color() {
        return false;
    }

    // Default to checking if stderr is a tty
    console::Term::stderr().is_term()
}

/// Apply the color decision to both terminal streams.
pub fn configure_colors(no_color_flag: bool) {
    let enabled = colors_enabled(no_color_flag);
    console::set_colors_enabled(enabled);
    console::set_colors_enabled_stderr(enabled);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_duration_formatting() {
        assert_eq!(Style::duration(Duration::from_millis(250)), "250ms");
        assert_eq!(Style::duration(Duration::from_secs_f64(12.34)), "12.3s");
        assert_eq!(Style::duration(Duration::from_secs(150)), "2.5m");
    }

    #[test]
    fn test_no_color_flag_disables_colors() {
        assert!(!colors_enabled(true));
    }
}
