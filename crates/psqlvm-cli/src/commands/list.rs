//! `psqlvm list` and `psqlvm current`.

use super::Context;
use psqlvm_core::{ExitCode, Result};
use psqlvm_edition::EditionState;
use psqlvm_ui::Style;

pub fn run(ctx: &Context, available: bool) -> Result<i32> {
    let output = &ctx.output;
    let manager = ctx.manager()?;
    let installed = manager.installed()?;
    let active = manager.active()?;

    if available {
        let catalog = manager.catalog();
        for edition in catalog.editions() {
            let mut notes = Vec::new();
            if active.as_ref() == Some(edition) {
                notes.push("active");
            } else if installed.contains(edition) {
                notes.push("installed");
            }
            if catalog.recommended() == Some(edition) {
                notes.push("recommended");
            }
            let marker = if active.as_ref() == Some(edition) { "*" } else { " " };
            if notes.is_empty() {
                output.println(&format!("{} {}", marker, edition));
            } else {
                output.println(&format!(
                    "{} {} {}",
                    marker,
                    edition,
                    Style::dim(format!("({})", notes.join(", ")))
                ));
            }
        }
        return Ok(0);
    }

    if installed.is_empty() {
        output.info("No editions installed.");
        output.info(&format!(
            "Run {} to install one.",
            Style::command("psqlvm install")
        ));
        return Ok(0);
    }

    for edition in installed.iter().rev() {
        let state = manager.state(edition)?;
        let marker = if state == EditionState::Active { "*" } else { " " };
        output.println(&format!(
            "{} {} {}",
            marker,
            Style::edition(edition),
            Style::dim(format!("({})", state))
        ));
    }
    Ok(0)
}

pub fn current(ctx: &Context) -> Result<i32> {
    let manager = ctx.manager()?;
    match manager.active()? {
        Some(edition) => {
            ctx.output.println(edition.as_str());
            Ok(0)
        }
        None => {
            ctx.output.info("No edition is active.");
            Ok(ExitCode::GeneralError.into())
        }
    }
}
