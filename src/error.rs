//! Error types for workstation provisioning.
//!
//! This module defines [`WorkstationError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Action failures and environment mismatches are fatal to a run
//! - Precondition errors are downgraded to "not satisfied" by the runner
//! - Use `anyhow::Error` (via `WorkstationError::Other`) for unexpected errors
//! - A declined confirmation is never an error, it is a recorded skip

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for provisioning.
#[derive(Debug, Error)]
pub enum WorkstationError {
    /// Playbook file not found at the requested location.
    #[error("Playbook not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse a playbook file.
    #[error("Failed to parse playbook at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid playbook structure or values.
    #[error("Invalid playbook: {message}")]
    ConfigValidationError { message: String },

    /// A precondition could not be evaluated.
    #[error("Could not evaluate precondition for '{step}': {message}")]
    PreconditionCheck { step: String, message: String },

    /// A step's external action reported failure.
    #[error("Step '{step}' failed: {message}")]
    ActionFailed {
        step: String,
        message: String,
        code: Option<i32>,
        output: Option<String>,
    },

    /// A discovered environment value contradicts what the playbook expects.
    #[error("Expected {subject} to be '{expected}' but found '{found}'. Fix it with: {remedy}")]
    EnvironmentMismatch {
        subject: String,
        expected: String,
        found: String,
        remedy: String,
    },

    /// A run stopped at a step. Wraps the step's own error.
    #[error("Provisioning failed at step '{step}': {reason}")]
    ProvisioningFailed {
        step: String,
        reason: String,
        #[source]
        source: Box<WorkstationError>,
    },

    /// Shell command could not be started.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WorkstationError {
    /// Whether a one-shot recovery command may be attempted for this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ActionFailed { .. })
    }

    /// Captured command output attached to the error, if any.
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::ActionFailed { output, .. } => output.as_deref(),
            Self::ProvisioningFailed { source, .. } => source.output(),
            _ => None,
        }
    }

    /// Wrap a step's error as the reason a run stopped.
    pub fn stopped_at(step: &str, source: WorkstationError) -> Self {
        let reason = match &source {
            Self::ActionFailed { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Self::ProvisioningFailed {
            step: step.to_string(),
            reason,
            source: Box::new(source),
        }
    }
}

/// Result type alias for provisioning operations.
pub type Result<T> = std::result::Result<T, WorkstationError>;
