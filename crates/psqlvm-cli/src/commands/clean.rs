//! `psqlvm clean`.

use super::{Context, pick_edition};
use psqlvm_core::{EditionId, Error, Result};
use psqlvm_telemetry::TimingGuard;
use psqlvm_ui::prompt;

pub async fn run(ctx: &Context, edition: Option<String>, yes: bool) -> Result<i32> {
    let output = &ctx.output;
    let manager = ctx.manager()?;
    let installed = manager.installed()?;
    let picked = edition.is_none();

    let Some(name) = pick_edition(edition, &installed, "Pick an installed edition", 0)? else {
        output.info("Nothing selected.");
        return Ok(0);
    };
    let edition: EditionId = name.parse().map_err(|_| {
        Error::unknown_edition(name.trim(), installed.iter().map(|e| e.to_string()).collect())
    })?;

    // An edition named on the command line is removed without asking.
    if picked
        && installed.contains(&edition)
        && !yes
        && !prompt::confirm(&format!("Remove PostgreSQL {}?", edition), false)?
    {
        output.info("Aborted.");
        return Ok(0);
    }

    let timing = TimingGuard::new("clean");
    let outcome = manager.remove(&edition).await?;
    if outcome.deactivated {
        output.warn(&format!("{} was active; no edition is active now", edition));
    }
    if outcome.removed {
        output.success_summary(&format!("Removed PostgreSQL {}", edition), timing.elapsed());
    } else {
        output.info(&format!("PostgreSQL {} was already removed.", edition));
    }
    Ok(0)
}
