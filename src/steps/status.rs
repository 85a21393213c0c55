//! Step status and per-step records.

use std::fmt;
use std::time::Duration;

use crate::ui::format_duration;

/// Status of a step within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepStatus {
    /// Not reached yet (or, in a dry run, would run).
    #[default]
    Pending,

    /// Action in progress.
    Running,

    /// Recovery command in progress after a failed action.
    Recovering,

    /// Action finished successfully.
    Done,

    /// Precondition already satisfied, or the user declined.
    Skipped,

    /// Action failed and could not be recovered.
    Failed,
}

impl StepStatus {
    /// Check if this is a terminal state (no more changes expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Skipped | Self::Failed)
    }

    /// Whether this status lets the run continue and count as complete.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Done | Self::Skipped)
    }

    /// Get a display character for this status.
    pub fn display_char(&self) -> char {
        match self {
            Self::Pending => '○',
            Self::Running => '◉',
            Self::Recovering => '↻',
            Self::Done => '✓',
            Self::Skipped => '⊘',
            Self::Failed => '✗',
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Recovering => "recovering",
            Self::Done => "done",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Why a step was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Precondition reported the work as already done.
    Satisfied(String),
    /// User answered no to the step gate.
    Declined,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Satisfied(description) => write!(f, "{}", description),
            Self::Declined => write!(f, "declined"),
        }
    }
}

/// Final record of one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    /// Step name.
    pub name: String,

    /// Final status.
    pub status: StepStatus,

    /// Skip reason, when skipped.
    pub skip_reason: Option<SkipReason>,

    /// Extra detail (what a profile step did, recovery notes).
    pub detail: Option<String>,

    /// Error message, when failed.
    pub error: Option<String>,

    /// Whether the recovery command ran.
    pub recovered: bool,

    /// Time spent on the action.
    pub duration: Duration,
}

impl StepRecord {
    fn new(name: &str, status: StepStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
            skip_reason: None,
            detail: None,
            error: None,
            recovered: false,
            duration: Duration::ZERO,
        }
    }

    /// Step skipped.
    pub fn skipped(name: &str, reason: SkipReason) -> Self {
        Self {
            skip_reason: Some(reason),
            ..Self::new(name, StepStatus::Skipped)
        }
    }

    /// Step done.
    pub fn done(name: &str, duration: Duration, detail: Option<String>) -> Self {
        Self {
            duration,
            detail,
            ..Self::new(name, StepStatus::Done)
        }
    }

    /// Step failed.
    pub fn failed(name: &str, duration: Duration, error: String) -> Self {
        Self {
            duration,
            error: Some(error),
            ..Self::new(name, StepStatus::Failed)
        }
    }

    /// Step that a dry run would execute.
    pub fn planned(name: &str, detail: String) -> Self {
        Self {
            detail: Some(detail),
            ..Self::new(name, StepStatus::Pending)
        }
    }

    /// Mark that recovery was attempted.
    pub fn with_recovery(mut self) -> Self {
        self.recovered = true;
        self
    }

    /// Generate a summary line for display.
    pub fn summary_line(&self) -> String {
        let c = self.status.display_char();
        match self.status {
            StepStatus::Done => {
                let mut notes = vec![format_duration(self.duration)];
                if self.recovered {
                    notes.push("after recovery".to_string());
                }
                if let Some(detail) = &self.detail {
                    notes.push(detail.clone());
                }
                format!("{} {} ({})", c, self.name, notes.join(", "))
            }
            StepStatus::Skipped => match &self.skip_reason {
                Some(reason) => format!("{} {} ({})", c, self.name, reason),
                None => format!("{} {}", c, self.name),
            },
            StepStatus::Failed => {
                let error = self.error.as_deref().unwrap_or("unknown error");
                format!("{} {} - {}", c, self.name, error)
            }
            StepStatus::Pending => match &self.detail {
                Some(detail) => format!("{} {} (would run: {})", c, self.name, detail),
                None => format!("{} {} (would run)", c, self.name),
            },
            _ => format!("{} {}", c, self.name),
        }
    }
}
