//! CLI argument parsing.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use psqlvm_core::EnvVars;
use std::path::PathBuf;

use crate::styles::STYLES;

/// psqlvm - PostgreSQL edition manager
#[derive(Parser, Debug)]
#[command(name = "psqlvm")]
#[command(author, version, about = "Build, install and switch between PostgreSQL editions")]
#[command(long_about = None)]
#[command(propagate_version = true)]
#[command(styles = STYLES)]
#[command(after_help = "Use `psqlvm help <command>` for more information about a command.")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global arguments available to all commands.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true, env = EnvVars::PSQLVM_VERBOSE)]
    pub verbose: bool,

    /// Suppress output (use twice for complete silence)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Disable colored output
    #[arg(long, global = true, env = EnvVars::PSQLVM_NO_COLOR)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = EnvVars::PSQLVM_CONFIG_FILE)]
    pub config_file: Option<PathBuf>,

    /// Home directory all managed directories are derived from
    #[arg(long, global = true, env = EnvVars::PSQLVM_HOME)]
    pub home: Option<PathBuf>,

    /// Mirror to download source archives from
    #[arg(long, global = true, env = EnvVars::PSQLVM_SOURCE_URL)]
    pub source_url: Option<String>,
}

/// Edition given positionally or with `--edition`.
#[derive(Args, Debug, Default)]
pub struct EditionArg {
    /// PostgreSQL edition such as 16.4 (prompts when omitted)
    #[arg(value_name = "EDITION")]
    pub edition: Option<String>,

    /// Same as the positional EDITION
    #[arg(
        short = 'e',
        long = "edition",
        value_name = "EDITION",
        conflicts_with = "edition"
    )]
    pub edition_flag: Option<String>,
}

impl EditionArg {
    pub fn into_inner(self) -> Option<String> {
        self.edition.or(self.edition_flag)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download, build and install an edition
    #[command(visible_alias = "i")]
    Install {
        #[command(flatten)]
        edition: EditionArg,

        /// Download the archive again even if it is cached
        #[arg(long)]
        refetch: bool,

        /// Activate the edition after it is built
        #[arg(long = "use")]
        activate: bool,
    },

    /// Switch the active edition
    #[command(visible_alias = "u")]
    Use {
        #[command(flatten)]
        edition: EditionArg,
    },

    /// Remove an installed edition
    #[command(visible_alias = "c")]
    Clean {
        #[command(flatten)]
        edition: EditionArg,

        /// Do not ask for confirmation after picking an edition
        #[arg(short, long)]
        yes: bool,
    },

    /// List installed editions
    #[command(visible_alias = "ls")]
    List {
        /// List every edition that can be installed
        #[arg(long)]
        available: bool,
    },

    /// Print the active edition
    Current,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration and directories
    Show,
    /// Print the configuration file location
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_edition_flag_and_positional() {
        let cli = Cli::try_parse_from(["psqlvm", "use", "14.2"]).unwrap();
        let Some(Commands::Use { edition }) = cli.command else {
            panic!("expected use");
        };
        assert_eq!(edition.into_inner().as_deref(), Some("14.2"));

        let cli = Cli::try_parse_from(["psqlvm", "u", "-e", "15.1"]).unwrap();
        let Some(Commands::Use { edition }) = cli.command else {
            panic!("expected use");
        };
        assert_eq!(edition.into_inner().as_deref(), Some("15.1"));

        assert!(Cli::try_parse_from(["psqlvm", "use", "14.2", "-e", "15.1"]).is_err());
    }

    #[test]
    fn test_install_flags() {
        let cli = Cli::try_parse_from(["psqlvm", "i", "16.4", "--refetch", "--use"]).unwrap();
        match cli.command {
            Some(Commands::Install {
                edition,
                refetch,
                activate,
            }) => {
                assert_eq!(edition.into_inner().as_deref(), Some("16.4"));
                assert!(refetch);
                assert!(activate);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
