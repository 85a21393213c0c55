//! User interface components.
//!
//! - [`UserInterface`] trait, the runner's only way to talk to the user
//! - [`TerminalUI`] for interactive terminal usage
//! - [`NonInteractiveUI`] for CI and `--yes` runs, answering every
//!   confirmation with its default
//! - [`MockUI`] for tests
//!
//! # Example
//!
//! ```
//! use workstation::ui::{create_ui, OutputMode};
//!
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! assert!(ui.confirm("Add ~/.local/bin to PATH?", true).unwrap());
//! ```

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod prompts;
pub mod spinner;
pub mod terminal;
pub mod theme;

pub use mock::{MockSpinner, MockUI, SpinnerStatus};
pub use non_interactive::NonInteractiveUI;
pub use output::{format_duration, OutputMode};
pub use prompts::prompt_confirm;
pub use spinner::ProgressSpinner;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, WorkstationTheme};

use std::time::Duration;

use crate::error::Result;
use crate::steps::{StepRecord, StepStatus};

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Display a skipped step or line.
    fn skipped(&mut self, msg: &str);

    /// Ask a yes/no question.
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool>;

    /// Start a spinner for an operation.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Announce step `index` of `total`.
    fn show_step(&mut self, index: usize, total: usize, title: &str);

    /// Show a failed command with its captured output and a remedy hint.
    fn show_error_block(&mut self, command: &str, output: &str, hint: Option<&str>);

    /// Show the end-of-run summary.
    fn show_summary(&mut self, summary: &RunSummary);

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    /// Update the spinner message.
    fn set_message(&mut self, msg: &str);

    /// Mark the operation as successful.
    fn finish_success(&mut self, msg: &str);

    /// Mark the operation as failed.
    fn finish_error(&mut self, msg: &str);

    /// Mark as skipped.
    fn finish_skipped(&mut self, msg: &str);
}

/// What happened in a run, for the final summary.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Runner version.
    pub version: String,
    /// Per-step records, in execution order.
    pub records: Vec<StepRecord>,
    /// Number of steps in the playbook.
    pub total_steps: usize,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
    /// Whether this was a dry run.
    pub dry_run: bool,
    /// Whether the version marker was written.
    pub marker_written: bool,
}

impl RunSummary {
    fn count(&self, status: StepStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }

    /// Steps that ran to completion.
    pub fn done(&self) -> usize {
        self.count(StepStatus::Done)
    }

    /// Steps skipped (satisfied or declined).
    pub fn skipped(&self) -> usize {
        self.count(StepStatus::Skipped)
    }

    /// Steps a dry run would execute.
    pub fn pending(&self) -> usize {
        self.count(StepStatus::Pending)
    }

    /// The step that stopped the run.
    pub fn failed(&self) -> Option<&StepRecord> {
        self.records.iter().find(|r| r.status == StepStatus::Failed)
    }

    /// Whether every step ended done or skipped.
    pub fn success(&self) -> bool {
        self.records.len() == self.total_steps && self.records.iter().all(|r| r.status.is_complete())
    }

    /// One-line outcome.
    pub fn headline(&self) -> String {
        if self.dry_run {
            return format!(
                "Dry run: {} of {} steps would run, {} already satisfied",
                self.pending(),
                self.total_steps,
                self.skipped()
            );
        }

        match self.failed() {
            Some(failed) => format!(
                "Stopped at step '{}' after {} of {} steps",
                failed.name,
                self.records.len(),
                self.total_steps
            ),
            None => format!(
                "Provisioned with workstation {}: {} done, {} skipped in {}",
                self.version,
                self.done(),
                self.skipped(),
                format_duration(self.elapsed)
            ),
        }
    }
}
