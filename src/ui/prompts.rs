//! Interactive prompts.

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;

use crate::error::{Result, WorkstationError};

/// Convert dialoguer errors to WorkstationError.
fn map_dialoguer_err(e: dialoguer::Error) -> WorkstationError {
    WorkstationError::Io(e.into())
}

/// Dialoguer theme without the default yellow `?` prefix.
fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("".to_string()),
        ..ColorfulTheme::default()
    }
}

/// Ask a yes/no question on `term`.
pub fn prompt_confirm(question: &str, default: bool, term: &Term) -> Result<bool> {
    Confirm::with_theme(&prompt_theme())
        .with_prompt(question)
        .default(default)
        .interact_on(term)
        .map_err(map_dialoguer_err)
}

/// Render an answer the way it is echoed back in non-interactive output.
pub fn answer_label(answer: bool) -> &'static str {
    if answer {
        "yes"
    } else {
        "no"
    }
}
