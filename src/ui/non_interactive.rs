//! Non-interactive UI for CI, piped output and `--yes` runs.

use crate::error::Result;

use super::prompts::answer_label;
use super::terminal::{error_block_lines, summary_lines, PlainSpinner};
use super::{OutputMode, RunSummary, SpinnerHandle, UserInterface, WorkstationTheme};

/// UI that never blocks.
///
/// Every confirmation is answered with its default, and the answer is
/// echoed so logs show what was decided.
pub struct NonInteractiveUI {
    mode: OutputMode,
    theme: WorkstationTheme,
    is_ci: bool,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            theme: WorkstationTheme::detect(),
            is_ci: crate::shell::is_ci(),
        }
    }

    /// Create with explicit CI flag (for testing).
    pub fn with_ci(mode: OutputMode, is_ci: bool) -> Self {
        Self {
            mode,
            theme: WorkstationTheme::plain(),
            is_ci,
        }
    }

    /// Whether a CI environment was detected.
    pub fn is_ci(&self) -> bool {
        self.is_ci
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("  {}", self.theme.format_success(msg));
        }
    }

    fn warning(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_warning(msg));
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn skipped(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("  {}", self.theme.format_skipped(msg));
        }
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        if self.mode.shows_status() {
            println!("  {} {} (default)", question, answer_label(default));
        }
        Ok(default)
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_status() {
            println!("  {}", message);
        }
        Box::new(PlainSpinner::new(self.mode, self.theme.clone()))
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", self.theme.format_header(title));
        }
    }

    fn show_step(&mut self, index: usize, total: usize, title: &str) {
        if self.mode.shows_status() {
            println!("{}", self.theme.format_step(index, total, title));
        }
    }

    fn show_error_block(&mut self, command: &str, output: &str, hint: Option<&str>) {
        eprintln!();
        for line in error_block_lines(command, output, hint, &self.theme) {
            eprintln!("{}", line);
        }
    }

    fn show_summary(&mut self, summary: &RunSummary) {
        for line in summary_lines(summary, self.mode, &self.theme) {
            println!("{}", line);
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}
