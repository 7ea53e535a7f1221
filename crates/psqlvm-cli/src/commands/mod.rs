//! Command implementations.

mod activate;
mod clean;
mod completions;
mod config;
mod install;
mod list;

use crate::cli::{Cli, Commands, ConfigCommands};
use anyhow::Result;
use clap::CommandFactory;
use psqlvm_config::{LoadOptions, Settings};
use psqlvm_core::{EditionId, Error, Fix};
use psqlvm_edition::DefaultEditionManager;
use psqlvm_ui::{Output, Printer, prompt};

/// Everything a command needs, built once per invocation.
pub struct Context {
    pub settings: Settings,
    pub output: Output,
}

impl Context {
    fn manager(&self) -> psqlvm_core::Result<DefaultEditionManager> {
        DefaultEditionManager::from_settings(&self.settings, self.output)
    }
}

/// Run the CLI command.
pub async fn run(cli: Cli) -> Result<i32> {
    let printer = Printer::from_flags(cli.global.quiet, cli.global.verbose);
    let output = Output::new(printer);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(0);
    };

    let options = LoadOptions {
        home: cli.global.home,
        config_file: cli.global.config_file,
        source_url: cli.global.source_url,
    };
    let settings = match Settings::load(options) {
        Ok(settings) => settings,
        Err(e) => return Ok(report(&output, Err(e.into()))),
    };
    let ctx = Context { settings, output };

    let result = match command {
        Commands::Install {
            edition,
            refetch,
            activate,
        } => install::run(&ctx, edition.into_inner(), refetch, activate).await,
        Commands::Use { edition } => activate::run(&ctx, edition.into_inner()).await,
        Commands::Clean { edition, yes } => clean::run(&ctx, edition.into_inner(), yes).await,
        Commands::List { available } => list::run(&ctx, available),
        Commands::Current => list::current(&ctx),
        Commands::Config { command } => match command {
            ConfigCommands::Show => config::show(&ctx),
            ConfigCommands::Path => config::path(&ctx),
        },
        Commands::Completions { shell } => Ok(completions::generate(shell)),
    };

    Ok(report(&output, result))
}

/// Print a failed command's error and map it to an exit code.
fn report(output: &Output, result: psqlvm_core::Result<i32>) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            output.print_error(&e);
            e.code().exit_code().into()
        }
    }
}

/// Use the edition given on the command line, or ask for one.
///
/// Returns `None` when the user cancels the prompt.
fn pick_edition(
    given: Option<String>,
    choices: &[EditionId],
    message: &str,
    default: usize,
) -> psqlvm_core::Result<Option<String>> {
    if let Some(name) = given {
        return Ok(Some(name));
    }
    if choices.is_empty() {
        return Err(Error::Prompt {
            message: "no editions are installed".into(),
            fixes: vec![Fix::with_command(
                "Install an edition first",
                "psqlvm install",
            )],
        });
    }
    let picked = prompt::select(message, choices, default)?;
    Ok(picked.map(|i| choices[i].to_string()))
}
