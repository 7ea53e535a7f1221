//! `psqlvm install`.

use super::{Context, activate, pick_edition};
use psqlvm_core::Result;
use psqlvm_edition::InstallOptions;
use psqlvm_telemetry::TimingGuard;
use psqlvm_ui::Style;

pub async fn run(ctx: &Context, edition: Option<String>, refetch: bool, activate_after: bool) -> Result<i32> {
    let output = &ctx.output;
    let manager = ctx.manager()?;
    let catalog = manager.catalog();

    let default = catalog
        .recommended()
        .and_then(|rec| catalog.editions().iter().position(|e| e == rec))
        .unwrap_or(0);
    let Some(name) = pick_edition(edition, catalog.editions(), "Pick an edition", default)? else {
        output.info("Nothing selected.");
        return Ok(0);
    };
    let edition = catalog.resolve(&name)?;

    let timing = TimingGuard::new("install");
    output.edition_status(edition.as_str(), "Installing...");
    output.verbose(&format!(
        "Source: {}",
        psqlvm_config::archive_url(&manager.config().source.base_url, &edition)
    ));

    let outcome = manager.install(&edition, &InstallOptions { refetch }).await?;
    if outcome.reused_archive {
        output.verbose("Used the cached source archive");
    }
    output.success_summary(&format!("Installed PostgreSQL {}", edition), timing.elapsed());
    output.list_item("location", &outcome.install_dir.display().to_string());

    if activate_after {
        return activate::switch(ctx, &manager, &edition).await;
    }

    output.info(&format!(
        "Run {} to start using it.",
        Style::command(format!("psqlvm use {}", edition))
    ));
    Ok(0)
}
