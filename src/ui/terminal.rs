//! Interactive terminal UI.

use console::Term;
use std::io::Write;

use crate::error::Result;

use super::{
    prompt_confirm, NonInteractiveUI, OutputMode, ProgressSpinner, RunSummary, SpinnerHandle,
    UserInterface, WorkstationTheme,
};

/// Interactive terminal UI implementation.
pub struct TerminalUI {
    term: Term,
    theme: WorkstationTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode) -> Self {
        Self {
            term: Term::stdout(),
            theme: WorkstationTheme::detect(),
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "  {}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.term, "{}", self.theme.format_error(msg)).ok();
    }

    fn skipped(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "  {}", self.theme.format_skipped(msg)).ok();
        }
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        prompt_confirm(question, default, &self.term)
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() {
            Box::new(ProgressSpinner::new(message, self.theme.clone()))
        } else {
            if self.mode.shows_status() {
                writeln!(self.term, "  {}", self.theme.command.apply_to(message)).ok();
            }
            Box::new(PlainSpinner::new(self.mode, self.theme.clone()))
        }
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn show_step(&mut self, index: usize, total: usize, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_step(index, total, title)).ok();
        }
    }

    fn show_error_block(&mut self, command: &str, output: &str, hint: Option<&str>) {
        for line in error_block_lines(command, output, hint, &self.theme) {
            writeln!(self.term, "{}", line).ok();
        }
    }

    fn show_summary(&mut self, summary: &RunSummary) {
        for line in summary_lines(summary, self.mode, &self.theme) {
            writeln!(self.term, "{}", line).ok();
        }
    }

    fn is_interactive(&self) -> bool {
        self.term.is_term()
    }
}

/// Spinner stand-in that prints the finish line once.
pub(crate) struct PlainSpinner {
    mode: OutputMode,
    theme: WorkstationTheme,
}

impl PlainSpinner {
    pub(crate) fn new(mode: OutputMode, theme: WorkstationTheme) -> Self {
        Self { mode, theme }
    }
}

impl SpinnerHandle for PlainSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("  {}", self.theme.format_success(msg));
        }
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!("  {}", self.theme.format_error(msg));
    }

    fn finish_skipped(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("  {}", self.theme.format_skipped(msg));
        }
    }
}

/// Lines of the boxed failure report.
pub(crate) fn error_block_lines(
    command: &str,
    output: &str,
    hint: Option<&str>,
    theme: &WorkstationTheme,
) -> Vec<String> {
    let b = &theme.border;
    let mut lines = vec![
        format!(
            "    {} {}",
            b.apply_to("┌─"),
            b.apply_to("Command ──────────────────────────")
        ),
        format!("    {} {}", b.apply_to("│"), theme.command.apply_to(command)),
    ];

    if !output.trim().is_empty() {
        lines.push(format!(
            "    {} {}",
            b.apply_to("├─"),
            b.apply_to("Output ───────────────────────────")
        ));
        for line in output.trim_end().lines() {
            lines.push(format!("    {} {}", b.apply_to("│"), line));
        }
    }

    lines.push(format!(
        "    {}",
        b.apply_to("└────────────────────────────────────")
    ));

    if let Some(h) = hint {
        lines.push(String::new());
        lines.push(format!(
            "    {} {}",
            theme.hint.apply_to("Fix it with:"),
            theme.hint.apply_to(h)
        ));
    }

    lines
}

/// Lines of the end-of-run summary.
pub(crate) fn summary_lines(
    summary: &RunSummary,
    mode: OutputMode,
    theme: &WorkstationTheme,
) -> Vec<String> {
    let mut lines = Vec::new();

    if mode.shows_status() && !summary.records.is_empty() {
        let b = &theme.border;
        lines.push(String::new());
        lines.push(format!(
            "  {} {}",
            b.apply_to("┌─"),
            b.apply_to("Summary ──────────────────────────")
        ));
        for record in &summary.records {
            lines.push(format!("  {} {}", b.apply_to("│"), record.summary_line()));
        }
        lines.push(format!(
            "  {}",
            b.apply_to("└────────────────────────────────────")
        ));
    }

    let headline = summary.headline();
    if summary.dry_run {
        lines.push(format!("  {}", theme.info.apply_to(headline)));
    } else if summary.success() {
        lines.push(format!("  {}", theme.format_success(&headline)));
    } else {
        lines.push(format!("  {}", theme.format_error(&headline)));
    }

    lines
}

/// Create the appropriate UI based on context.
///
/// Falls back to [`NonInteractiveUI`] when stdout is not a terminal.
pub fn create_ui(interactive: bool, mode: OutputMode) -> Box<dyn UserInterface> {
    if interactive && Term::stdout().is_term() {
        Box::new(TerminalUI::new(mode))
    } else {
        Box::new(NonInteractiveUI::new(mode))
    }
}
