//! Environment variable constants for psqlvm.
//!
//! This module defines all environment variables that psqlvm recognizes,
//! providing a single source of truth for environment configuration.

/// Environment variable names used by psqlvm.
pub struct EnvVars;

impl EnvVars {
    // ─── Global Settings ─────────────────────────────────────────────────────

    /// Path to the psqlvm configuration file.
    pub const PSQLVM_CONFIG_FILE: &'static str = "PSQLVM_CONFIG_FILE";

    /// Home directory override; every managed directory is derived from it.
    pub const PSQLVM_HOME: &'static str = "PSQLVM_HOME";

    /// Enable verbose output.
    pub const PSQLVM_VERBOSE: &'static str = "PSQLVM_VERBOSE";

    /// Disable colored output.
    pub const PSQLVM_NO_COLOR: &'static str = "PSQLVM_NO_COLOR";

    /// Enable JSON log output.
    pub const PSQLVM_LOG_JSON: &'static str = "PSQLVM_LOG_JSON";

    // ─── Source Settings ─────────────────────────────────────────────────────

    /// Base URL for source archives.
    pub const PSQLVM_SOURCE_URL: &'static str = "PSQLVM_SOURCE_URL";

    // ─── Standard Environment Variables ──────────────────────────────────────

    /// Standard NO_COLOR environment variable.
    pub const NO_COLOR: &'static str = "NO_COLOR";

    /// Standard CLICOLOR environment variable.
    pub const CLICOLOR: &'static str = "CLICOLOR";

    /// CI environment indicator.
    pub const CI: &'static str = "CI";

    /// Standard HOME environment variable.
    pub const HOME: &'static str = "HOME";

    /// Windows home directory.
    pub const USERPROFILE: &'static str = "USERPROFILE";
}

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    std::env::var(EnvVars::CI).is_ok()
}

/// Check if colors should be disabled based on environment.
pub fn no_color() -> bool {
    std::env::var(EnvVars::NO_COLOR).is_ok()
        || std::env::var(EnvVars::PSQLVM_NO_COLOR).is_ok()
        || std::env::var(EnvVars::CLICOLOR)
            .map(|v| v == "0")
            .unwrap_or(false)
}
