//! Terminal UI helpers for psqlvm.
//!
//! This crate provides consistent output formatting, spinners, progress bars,
//! prompts and error display for the psqlvm CLI.

pub mod output;
pub mod printer;
pub mod prompt;
pub mod spinner;
pub mod style;

pub use output::Output;
pub use printer::Printer;
pub use spinner::{Progress, Spinner};
pub use style::Style;
