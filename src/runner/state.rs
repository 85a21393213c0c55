//! Run state.

use std::time::Duration;

use chrono::{DateTime, Local};

use crate::environment::Environment;
use crate::state::VERSION;
use crate::steps::StepRecord;

/// Record of the current invocation.
///
/// Built once at the start of a run and discarded at the end. Nothing here
/// is persisted except, on full success, the version.
#[derive(Debug, Clone)]
pub struct RunState {
    /// Runner version, `MAJOR.MINOR.PATCH`.
    pub version: String,
    /// Resolved parameters every step sees.
    pub environment: Environment,
    /// Whether the whole sequence finished without a fatal error.
    pub completed: bool,
    /// Per-step outcomes, in execution order.
    pub records: Vec<StepRecord>,
    /// When the run started.
    pub started_at: DateTime<Local>,
}

impl RunState {
    /// Start a run at the current crate version.
    pub fn new(environment: Environment) -> Self {
        Self::with_version(environment, VERSION)
    }

    /// Start a run at an explicit version.
    pub fn with_version(environment: Environment, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            environment,
            completed: false,
            records: Vec::new(),
            started_at: Local::now(),
        }
    }

    /// Append a step outcome.
    pub fn record(&mut self, record: StepRecord) {
        tracing::debug!("{} -> {}", record.name, record.status);
        self.records.push(record);
    }

    /// Whether `total` steps were recorded and every one ended done or skipped.
    pub fn all_complete(&self, total: usize) -> bool {
        self.records.len() == total && self.records.iter().all(|r| r.status.is_complete())
    }

    /// Time since the run started.
    pub fn elapsed(&self) -> Duration {
        (Local::now() - self.started_at).to_std().unwrap_or_default()
    }
}
