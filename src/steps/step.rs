//! Step descriptors.

use std::path::{Path, PathBuf};

use crate::config::{resolve_string, CheckConfig, InterpolationContext, StepConfig};
use crate::error::{Result, WorkstationError};

use super::action::{Action, Expectation, ProfileLine};
use super::check::Check;

/// A yes/no gate with a default answer.
///
/// Never persisted: it is asked again on every run unless the work it
/// guards is already in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// Question shown to the user.
    pub prompt: String,
    /// Answer used on enter, and in non-interactive runs.
    pub default: bool,
}

impl Confirmation {
    /// Create a confirmation.
    pub fn new(prompt: impl Into<String>, default: bool) -> Self {
        Self {
            prompt: prompt.into(),
            default,
        }
    }
}

/// A named unit of provisioning work, ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Unique name.
    pub name: String,
    /// Display title.
    pub title: String,
    /// Explicit precondition.
    pub check: Option<Check>,
    /// Step-level gate.
    pub confirm: Option<Confirmation>,
    /// The work itself.
    pub action: Action,
    /// One-shot recovery command.
    pub recover: Option<String>,
    /// Directory the action runs in.
    pub workdir: Option<PathBuf>,
}

impl Step {
    /// Create a step with no precondition, gate or recovery.
    pub fn new(name: impl Into<String>, action: Action) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            check: None,
            confirm: None,
            action,
            recover: None,
            workdir: None,
        }
    }

    /// Create a shell command step.
    pub fn command(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self::new(name, Action::Command(command.into()))
    }

    /// Create a profile step.
    pub fn profile(name: impl Into<String>, lines: Vec<ProfileLine>) -> Self {
        Self::new(name, Action::Profile(lines))
    }

    /// Set the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the precondition.
    pub fn with_check(mut self, check: Check) -> Self {
        self.check = Some(check);
        self
    }

    /// Gate the step behind a confirmation.
    pub fn with_confirm(mut self, prompt: impl Into<String>, default: bool) -> Self {
        self.confirm = Some(Confirmation::new(prompt, default));
        self
    }

    /// Set the recovery command.
    pub fn with_recover(mut self, command: impl Into<String>) -> Self {
        self.recover = Some(command.into());
        self
    }

    /// Set the working directory.
    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    /// The precondition the runner evaluates.
    ///
    /// Profile steps without an explicit check are satisfied when every line
    /// is already present.
    pub fn precondition(&self) -> Option<Check> {
        match (&self.check, &self.action) {
            (Some(check), _) => Some(check.clone()),
            (None, Action::Profile(lines)) if !lines.is_empty() => Some(Check::All(
                lines
                    .iter()
                    .map(|l| Check::ProfileContains(l.line.clone()))
                    .collect(),
            )),
            _ => None,
        }
    }

    /// Build a step from playbook config, resolving `${var}` references.
    ///
    /// Relative and `~` paths are resolved against `home`.
    pub fn from_config(
        config: &StepConfig,
        ctx: &InterpolationContext,
        home: &Path,
    ) -> Result<Self> {
        let name = config.name.trim().to_string();
        let resolve = |value: &str| resolve_string(value, ctx).map_err(|e| at_step(&name, e));

        let action = if let Some(command) = &config.command {
            Action::Command(resolve(command)?)
        } else if let Some(expect) = &config.expect {
            let command = resolve(&expect.command)?;
            Action::Expect(Expectation {
                subject: match &expect.subject {
                    Some(subject) => resolve(subject)?,
                    None => format!("`{}`", command),
                },
                equals: resolve(&expect.equals)?,
                remedy: resolve(&expect.remedy)?,
                command,
            })
        } else if !config.lines.is_empty() {
            let mut lines = Vec::with_capacity(config.lines.len());
            for entry in &config.lines {
                lines.push(ProfileLine {
                    line: resolve(&entry.line)?,
                    gate: match &entry.confirm {
                        Some(c) => Some(Confirmation::new(resolve(&c.prompt)?, c.default)),
                        None => None,
                    },
                });
            }
            Action::Profile(lines)
        } else {
            return Err(WorkstationError::ConfigValidationError {
                message: format!("Step '{}' has no action", name),
            });
        };

        let check = match &config.check {
            Some(check) => Some(resolve_check(check, &resolve, home)?),
            None => None,
        };

        let confirm = match &config.confirm {
            Some(c) => Some(Confirmation::new(resolve(&c.prompt)?, c.default)),
            None => None,
        };

        let title = match &config.title {
            Some(title) => resolve(title)?,
            None => name.clone(),
        };

        Ok(Self {
            title,
            check,
            confirm,
            action,
            recover: config.recover.as_deref().map(resolve).transpose()?,
            workdir: config
                .workdir
                .as_deref()
                .map(|dir| resolve(dir).map(|d| expand_path(&d, home)))
                .transpose()?,
            name,
        })
    }
}

fn resolve_check<F>(check: &CheckConfig, resolve: &F, home: &Path) -> Result<Check>
where
    F: Fn(&str) -> Result<String>,
{
    Ok(match check {
        CheckConfig::CommandSucceeds(command) => Check::CommandSucceeds(resolve(command)?),
        CheckConfig::FileExists(path) => Check::FileExists(expand_path(&resolve(path)?, home)),
        CheckConfig::OnPath(binary) => Check::OnPath(resolve(binary)?),
        CheckConfig::ProfileContains(line) => Check::ProfileContains(resolve(line)?),
        CheckConfig::All(checks) => Check::All(
            checks
                .iter()
                .map(|c| resolve_check(c, resolve, home))
                .collect::<Result<_>>()?,
        ),
        CheckConfig::Any(checks) => Check::Any(
            checks
                .iter()
                .map(|c| resolve_check(c, resolve, home))
                .collect::<Result<_>>()?,
        ),
    })
}

fn expand_path(value: &str, home: &Path) -> PathBuf {
    let expanded = shellexpand::tilde_with_context(value, || home.to_str());
    let expanded = PathBuf::from(expanded.into_owned());
    if expanded.is_absolute() {
        expanded
    } else {
        home.join(expanded)
    }
}

fn at_step(step: &str, err: WorkstationError) -> WorkstationError {
    match err {
        WorkstationError::ConfigValidationError { message } => {
            WorkstationError::ConfigValidationError {
                message: format!("Step '{}': {}", step, message),
            }
        }
        other => other,
    }
}
