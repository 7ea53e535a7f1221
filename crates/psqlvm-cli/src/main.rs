//! psqlvm - PostgreSQL edition manager
//!
//! Downloads, builds and switches between PostgreSQL releases built from
//! source.

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod styles;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    psqlvm_ui::style::configure_colors(cli.global.no_color);
    psqlvm_telemetry::init(cli.global.verbose);

    let exit_code = commands::run(cli).await?;

    std::process::exit(exit_code);
}
