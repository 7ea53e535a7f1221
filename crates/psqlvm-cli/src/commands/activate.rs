//! `psqlvm use`.

use super::{Context, pick_edition};
use psqlvm_core::{EditionId, Error, Result};
use psqlvm_edition::DefaultEditionManager;
use psqlvm_telemetry::TimingGuard;
use psqlvm_ui::Style;
use std::path::Path;

pub async fn run(ctx: &Context, edition: Option<String>) -> Result<i32> {
    let manager = ctx.manager()?;
    let installed = manager.installed()?;

    let default = installed.len().saturating_sub(1);
    let Some(name) = pick_edition(edition, &installed, "Pick an edition", default)? else {
        ctx.output.info("Nothing selected.");
        return Ok(0);
    };
    let edition: EditionId = name.parse().map_err(|_| {
        Error::unknown_edition(name.trim(), installed.iter().map(|e| e.to_string()).collect())
    })?;

    switch(ctx, &manager, &edition).await
}

/// Activate an edition and report the outcome.
pub async fn switch(
    ctx: &Context,
    manager: &DefaultEditionManager,
    edition: &EditionId,
) -> Result<i32> {
    let output = &ctx.output;
    let timing = TimingGuard::new("use");
    output.edition_status(edition.as_str(), "Switching...");

    let report = manager.activate(edition).await?;
    for entry in &report.linked {
        output.verbose(&format!("  {}", entry.display()));
    }
    for failure in &report.failed {
        output.warn(&format!(
            "could not expose {} ({}): {}",
            failure.name,
            failure.target.display(),
            failure.reason
        ));
    }
    if report.linked.is_empty() {
        output.warn(&format!(
            "no binaries found for {}; has it been built?",
            edition
        ));
    }

    let summary = if report.is_complete() {
        format!(
            "Switched to {} ({} binaries)",
            Style::edition(edition),
            report.linked.len()
        )
    } else {
        format!(
            "Switched to {} ({} binaries, {} failed)",
            Style::edition(edition),
            report.linked.len(),
            report.failed.len()
        )
    };
    output.success_summary(&summary, timing.elapsed());

    if !on_path(&report.active_dir) {
        output.info(&format!(
            "Add {} to your PATH to use these binaries.",
            Style::command(report.active_dir.display())
        ));
    }
    Ok(0)
}

fn on_path(dir: &Path) -> bool {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).any(|p| p == dir))
        .unwrap_or(false)
}
