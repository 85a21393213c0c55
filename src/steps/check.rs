//! Precondition checks.
//!
//! A precondition decides whether a step's work is already in place. Checks
//! are cheap and must not change anything: they are the only thing standing
//! between a re-run and duplicate work.

use std::path::PathBuf;

use crate::error::Result;
use crate::profile::ProfileStore;
use crate::shell::{find_on_path, Executor};

/// Result of evaluating a precondition.
///
/// `description` is user-visible: it is shown next to skipped steps.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    /// Whether the check passed (the step's work is already done).
    pub complete: bool,

    /// Description of what was checked.
    pub description: String,

    /// Details about the check result.
    pub details: Option<String>,
}

impl CheckResult {
    /// Create a complete result.
    pub fn complete(description: impl Into<String>) -> Self {
        Self {
            complete: true,
            description: description.into(),
            details: None,
        }
    }

    /// Create an incomplete result.
    pub fn incomplete(description: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            complete: false,
            description: description.into(),
            details: Some(details.into()),
        }
    }
}

/// A resolved precondition.
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    /// Shell command exits 0.
    CommandSucceeds(String),
    /// Path exists.
    FileExists(PathBuf),
    /// Executable is found on the search path.
    OnPath(String),
    /// Line is present in the shell profile.
    ProfileContains(String),
    /// Every nested check passes.
    All(Vec<Check>),
    /// At least one nested check passes.
    Any(Vec<Check>),
}

/// What a check may look at.
pub struct Probes<'a> {
    /// Runs `command_succeeds` probes.
    pub executor: &'a mut dyn Executor,
    /// Answers `profile_contains`.
    pub profile: &'a dyn ProfileStore,
    /// `PATH` used for `on_path`.
    pub search_path: &'a str,
}

impl Check {
    /// Evaluate the check.
    ///
    /// # Errors
    ///
    /// Returns an error when the check itself could not be carried out
    /// (a probe that cannot be spawned, an unreadable profile).
    pub fn evaluate(&self, probes: &mut Probes<'_>) -> Result<CheckResult> {
        match self {
            Check::CommandSucceeds(command) => {
                if probes.executor.probe(command)? {
                    Ok(CheckResult::complete(format!("`{}` succeeded", command)))
                } else {
                    Ok(CheckResult::incomplete(
                        format!("`{}` failed", command),
                        "Exit code was non-zero",
                    ))
                }
            }
            Check::FileExists(path) => {
                if path.exists() {
                    Ok(CheckResult::complete(format!("{} exists", path.display())))
                } else {
                    Ok(CheckResult::incomplete(
                        format!("{} missing", path.display()),
                        format!("Expected at: {}", path.display()),
                    ))
                }
            }
            Check::OnPath(binary) => match find_on_path(binary, probes.search_path) {
                Some(found) => Ok(CheckResult::complete(format!(
                    "{} found at {}",
                    binary,
                    found.display()
                ))),
                None => Ok(CheckResult::incomplete(
                    format!("{} not on PATH", binary),
                    "No executable with that name in any PATH entry",
                )),
            },
            Check::ProfileContains(line) => {
                if probes.profile.contains(line)? {
                    Ok(CheckResult::complete(format!(
                        "already in {}",
                        probes.profile.location()
                    )))
                } else {
                    Ok(CheckResult::incomplete(
                        format!("missing from {}", probes.profile.location()),
                        line.clone(),
                    ))
                }
            }
            Check::All(checks) => {
                let mut failed = Vec::new();
                for check in checks {
                    let result = check.evaluate(probes)?;
                    if !result.complete {
                        failed.push(result.description);
                    }
                }

                if failed.is_empty() {
                    Ok(CheckResult::complete(match checks.as_slice() {
                        [only] => only.describe(),
                        _ => format!("all {} checks passed", checks.len()),
                    }))
                } else {
                    Ok(CheckResult::incomplete(
                        format!("{}/{} checks failed", failed.len(), checks.len()),
                        failed.join("; "),
                    ))
                }
            }
            Check::Any(checks) => {
                let mut failed = Vec::new();
                for check in checks {
                    let result = check.evaluate(probes)?;
                    if result.complete {
                        return Ok(result);
                    }
                    failed.push(result.description);
                }

                Ok(CheckResult::incomplete(
                    format!("none of {} checks passed", checks.len()),
                    failed.join("; "),
                ))
            }
        }
    }

    /// Short human description of what the check looks for.
    pub fn describe(&self) -> String {
        match self {
            Check::CommandSucceeds(command) => format!("`{}` succeeds", command),
            Check::FileExists(path) => format!("{} exists", path.display()),
            Check::OnPath(binary) => format!("{} on PATH", binary),
            Check::ProfileContains(_) => "line in profile".to_string(),
            Check::All(checks) if checks.len() == 1 => checks[0].describe(),
            Check::All(checks) => format!("all of {} checks", checks.len()),
            Check::Any(checks) => format!("any of {} checks", checks.len()),
        }
    }
}
