//! Progress spinners.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::theme::WorkstationTheme;
use super::SpinnerHandle;

/// A spinner shown while a step's command runs.
pub struct ProgressSpinner {
    bar: ProgressBar,
    theme: WorkstationTheme,
}

impl ProgressSpinner {
    /// Create and start a spinner.
    pub fn new(message: &str, theme: WorkstationTheme) -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Self { bar, theme }
    }

    /// Create a spinner that draws nothing.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            theme: WorkstationTheme::plain(),
        }
    }

    fn finish(&mut self, line: String) {
        let style = ProgressStyle::default_spinner()
            .template("  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        self.bar.set_style(style);
        self.bar.finish_with_message(line);
    }
}

impl SpinnerHandle for ProgressSpinner {
    fn set_message(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        let line = self.theme.format_success(msg);
        self.finish(line);
    }

    fn finish_error(&mut self, msg: &str) {
        let line = self.theme.format_error(msg);
        self.finish(line);
    }

    fn finish_skipped(&mut self, msg: &str) {
        let line = self.theme.format_skipped(msg);
        self.finish(line);
    }
}

impl Drop for ProgressSpinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
