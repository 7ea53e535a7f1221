//! Interactive prompts.
//!
//! Prompts only run on an interactive terminal; otherwise they fail with a
//! usage-style error instead of blocking on stdin.

use console::Term;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Select};
use psqlvm_core::{Error, Fix};

/// Whether prompts can be shown.
pub fn is_interactive() -> bool {
    Term::stderr().is_term() && !psqlvm_core::env::is_ci()
}

fn not_interactive(what: &str, hint: &str) -> Error {
    Error::Prompt {
        message: format!("cannot ask for {} without an interactive terminal", what),
        fixes: vec![Fix::new(hint.to_string())],
    }
}

fn prompt_error(e: dialoguer::Error) -> Error {
    Error::Prompt {
        message: e.to_string(),
        fixes: vec![],
    }
}

/// Ask the user to pick one item.
///
/// Returns `Ok(None)` when the user cancels with Esc or `q`.
pub fn select<T: ToString>(message: &str, items: &[T], default: usize) -> Result<Option<usize>, Error> {
    if items.is_empty() {
        return Ok(None);
    }
    if !is_interactive() {
        return Err(not_interactive(
            "a selection",
            "Pass the edition as an argument",
        ));
    }

    Select::with_theme(&ColorfulTheme::default())
        .with_prompt(message)
        .items(items)
        .default(default.min(items.len() - 1))
        .interact_on_opt(&Term::stderr())
        .map_err(prompt_error)
}

/// Ask a yes/no question.
pub fn confirm(message: &str, default: bool) -> Result<bool, Error> {
    if !is_interactive() {
        return Err(not_interactive("confirmation", "Pass --yes to skip confirmation"));
    }

    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(message)
        .default(default)
        .interact_on(&Term::stderr())
        .map_err(prompt_error)
}
