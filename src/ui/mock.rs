//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion. Confirmations can be answered from
//! pre-configured responses; anything unconfigured gets its default.
//!
//! # Example
//!
//! ```
//! use workstation::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.set_confirm_response("Generate a new SSH key?", false);
//!
//! assert!(!ui.confirm("Generate a new SSH key?", true).unwrap());
//! assert!(ui.confirm("Add ~/.local/bin to PATH?", true).unwrap());
//! assert_eq!(ui.confirms().len(), 2);
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::error::Result;

use super::{OutputMode, RunSummary, SpinnerHandle, UserInterface};

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    skips: Vec<String>,
    headers: Vec<String>,
    steps: Vec<(usize, usize, String)>,
    spinners: Vec<String>,
    spinner_results: Rc<RefCell<Vec<(SpinnerStatus, String)>>>,
    error_blocks: Vec<(String, String, Option<String>)>,
    summaries: Vec<RunSummary>,
    confirm_responses: HashMap<String, bool>,
    confirm_queues: HashMap<String, VecDeque<bool>>,
    confirms: Vec<String>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self {
            mode: OutputMode::Normal,
            ..Default::default()
        }
    }

    /// Create a new MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Answer `question` with `answer` every time it is asked.
    pub fn set_confirm_response(&mut self, question: &str, answer: bool) {
        self.confirm_responses.insert(question.to_string(), answer);
    }

    /// Queue answers for a question asked several times.
    ///
    /// Once the queue is exhausted, falls back to `set_confirm_response`
    /// or the question's default.
    pub fn queue_confirm_responses(&mut self, question: &str, answers: Vec<bool>) {
        self.confirm_queues
            .insert(question.to_string(), answers.into_iter().collect());
    }

    /// Set whether this mock behaves as interactive.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    /// Get all captured messages.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Get all captured success messages.
    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    /// Get all captured warning messages.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Get all captured error messages.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Get all captured skip messages.
    pub fn skips(&self) -> &[String] {
        &self.skips
    }

    /// Get all captured headers.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Get all announced steps as (index, total, title).
    pub fn steps(&self) -> &[(usize, usize, String)] {
        &self.steps
    }

    /// Get all spinner messages that were started.
    pub fn spinners(&self) -> &[String] {
        &self.spinners
    }

    /// Get how each spinner finished, in order.
    pub fn spinner_results(&self) -> Vec<(SpinnerStatus, String)> {
        self.spinner_results.borrow().clone()
    }

    /// Get all captured error blocks as (command, output, hint).
    pub fn error_blocks(&self) -> &[(String, String, Option<String>)] {
        &self.error_blocks
    }

    /// Get all captured run summaries.
    pub fn summaries(&self) -> &[RunSummary] {
        &self.summaries
    }

    /// Get every question asked, in order.
    pub fn confirms(&self) -> &[String] {
        &self.confirms
    }

    /// Check whether `question` was asked.
    pub fn was_confirmed(&self, question: &str) -> bool {
        self.confirms.iter().any(|q| q == question)
    }

    /// Check if a specific message was shown.
    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    /// Check if a specific success was shown.
    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    /// Check if a specific error was shown.
    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }

    /// Check if a specific warning was shown.
    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    /// Check if a specific skip was shown.
    pub fn has_skip(&self, msg: &str) -> bool {
        self.skips.iter().any(|m| m.contains(msg))
    }

    /// Clear all captured interactions.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.successes.clear();
        self.warnings.clear();
        self.errors.clear();
        self.skips.clear();
        self.headers.clear();
        self.steps.clear();
        self.spinners.clear();
        self.spinner_results.borrow_mut().clear();
        self.error_blocks.clear();
        self.summaries.clear();
        self.confirms.clear();
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn skipped(&mut self, msg: &str) {
        self.skips.push(msg.to_string());
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        self.confirms.push(question.to_string());

        if let Some(answer) = self
            .confirm_queues
            .get_mut(question)
            .and_then(VecDeque::pop_front)
        {
            return Ok(answer);
        }

        Ok(self
            .confirm_responses
            .get(question)
            .copied()
            .unwrap_or(default))
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.spinners.push(message.to_string());
        Box::new(MockSpinner::recording(Rc::clone(&self.spinner_results)))
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn show_step(&mut self, index: usize, total: usize, title: &str) {
        self.steps.push((index, total, title.to_string()));
    }

    fn show_error_block(&mut self, command: &str, output: &str, hint: Option<&str>) {
        self.error_blocks.push((
            command.to_string(),
            output.to_string(),
            hint.map(|h| h.to_string()),
        ));
    }

    fn show_summary(&mut self, summary: &RunSummary) {
        self.summaries.push(summary.clone());
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Mock spinner that captures finish messages.
#[derive(Debug, Default)]
pub struct MockSpinner {
    messages: Vec<String>,
    finish_message: Option<String>,
    status: Option<SpinnerStatus>,
    sink: Option<Rc<RefCell<Vec<(SpinnerStatus, String)>>>>,
}

/// Status of a mock spinner when finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinnerStatus {
    /// Finished successfully.
    Success,
    /// Finished with error.
    Error,
    /// Finished as skipped.
    Skipped,
}

impl MockSpinner {
    /// Create a new mock spinner.
    pub fn new() -> Self {
        Self::default()
    }

    fn recording(sink: Rc<RefCell<Vec<(SpinnerStatus, String)>>>) -> Self {
        Self {
            sink: Some(sink),
            ..Default::default()
        }
    }

    /// Get all messages set during spinning.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Get the final finish message.
    pub fn finish_message(&self) -> Option<&str> {
        self.finish_message.as_deref()
    }

    /// Get the final status.
    pub fn status(&self) -> Option<SpinnerStatus> {
        self.status
    }

    fn finish(&mut self, status: SpinnerStatus, msg: &str) {
        self.finish_message = Some(msg.to_string());
        self.status = Some(status);
        if let Some(sink) = &self.sink {
            sink.borrow_mut().push((status, msg.to_string()));
        }
    }
}

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        self.finish(SpinnerStatus::Success, msg);
    }

    fn finish_error(&mut self, msg: &str) {
        self.finish(SpinnerStatus::Error, msg);
    }

    fn finish_skipped(&mut self, msg: &str) {
        self.finish(SpinnerStatus::Skipped, msg);
    }
}
