//! Step actions.
//!
//! The work a step does once its precondition says it is needed. Actions
//! reach the machine only through the [`Executor`] and [`ProfileStore`]
//! capabilities.

use crate::error::{Result, WorkstationError};
use crate::profile::ProfileStore;
use crate::shell::{CommandOptions, CommandResult, Executor};
use crate::ui::UserInterface;

use super::step::Confirmation;

/// What a step does.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Run a shell command.
    Command(String),
    /// Append lines to the shell profile.
    Profile(Vec<ProfileLine>),
    /// Assert that a command prints an expected value.
    Expect(Expectation),
}

/// A line destined for the shell profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileLine {
    /// The line itself.
    pub line: String,
    /// Optional gate asked before appending.
    pub gate: Option<Confirmation>,
}

impl ProfileLine {
    /// An ungated line.
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            gate: None,
        }
    }

    /// Gate this line behind a confirmation.
    pub fn confirm(mut self, prompt: impl Into<String>, default: bool) -> Self {
        self.gate = Some(Confirmation::new(prompt, default));
        self
    }
}

/// An environment assertion.
#[derive(Debug, Clone, PartialEq)]
pub struct Expectation {
    /// Command whose last non-empty output line is compared.
    pub command: String,
    /// Expected value.
    pub equals: String,
    /// Command the user should run to fix a mismatch.
    pub remedy: String,
    /// What is being checked, for the error message.
    pub subject: String,
}

/// Everything an action may touch.
pub struct ActionContext<'a> {
    /// Runs external commands.
    pub executor: &'a mut dyn Executor,
    /// The shell profile.
    pub profile: &'a mut dyn ProfileStore,
    /// Asks line-level confirmations.
    pub ui: &'a mut dyn UserInterface,
}

/// What an action did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionOutcome {
    /// Profile lines appended.
    pub appended: usize,
    /// Profile lines already present.
    pub present: usize,
    /// Profile lines the user declined.
    pub declined: usize,
}

impl ActionOutcome {
    /// One-line summary for the step result, if there is anything to say.
    pub fn detail(&self) -> Option<String> {
        if self.appended == 0 && self.present == 0 && self.declined == 0 {
            return None;
        }

        let mut parts = Vec::new();
        if self.appended > 0 {
            parts.push(format!("{} added", self.appended));
        }
        if self.present > 0 {
            parts.push(format!("{} already present", self.present));
        }
        if self.declined > 0 {
            parts.push(format!("{} declined", self.declined));
        }
        Some(parts.join(", "))
    }
}

impl Action {
    /// Whether this action runs an external command.
    pub fn is_command(&self) -> bool {
        matches!(self, Action::Command(_))
    }

    /// Perform the action for step `step`.
    ///
    /// # Errors
    ///
    /// `ActionFailed` when a command exits non-zero, `EnvironmentMismatch`
    /// when an expectation does not hold.
    pub fn perform(
        &self,
        step: &str,
        ctx: &mut ActionContext<'_>,
        options: &CommandOptions,
    ) -> Result<ActionOutcome> {
        match self {
            Action::Command(command) => {
                let result = ctx.executor.run(command, options)?;
                ensure_success(step, command, &result)?;
                Ok(ActionOutcome::default())
            }
            Action::Profile(lines) => append_lines(lines, ctx),
            Action::Expect(expectation) => {
                let result = ctx
                    .executor
                    .run(&expectation.command, &CommandOptions::captured())?;
                ensure_success(step, &expectation.command, &result)?;

                let found = last_line(&result.stdout);
                if found == expectation.equals.trim() {
                    Ok(ActionOutcome::default())
                } else {
                    Err(WorkstationError::EnvironmentMismatch {
                        subject: expectation.subject.clone(),
                        expected: expectation.equals.clone(),
                        found: found.to_string(),
                        remedy: expectation.remedy.clone(),
                    })
                }
            }
        }
    }
}

fn append_lines(lines: &[ProfileLine], ctx: &mut ActionContext<'_>) -> Result<ActionOutcome> {
    let mut outcome = ActionOutcome::default();

    for entry in lines {
        // Present lines are never re-asked.
        if ctx.profile.contains(&entry.line)? {
            outcome.present += 1;
            continue;
        }

        if let Some(gate) = &entry.gate {
            if !ctx.ui.confirm(&gate.prompt, gate.default)? {
                tracing::info!("Declined profile line: {}", entry.line);
                outcome.declined += 1;
                continue;
            }
        }

        ctx.profile.append(&entry.line)?;
        outcome.appended += 1;
    }

    Ok(outcome)
}

/// Turn a non-zero exit into `ActionFailed`.
pub fn ensure_success(step: &str, command: &str, result: &CommandResult) -> Result<()> {
    if result.success {
        return Ok(());
    }

    let message = match result.exit_code {
        Some(code) => format!("`{}` exited with status {}", command, code),
        None => format!("`{}` was terminated by a signal", command),
    };
    let output = result.combined_output();

    Err(WorkstationError::ActionFailed {
        step: step.to_string(),
        message,
        code: result.exit_code,
        output: (!output.trim().is_empty()).then_some(output),
    })
}

fn last_line(output: &str) -> &str {
    output
        .lines()
        .map(str::trim)
        .rfind(|l| !l.is_empty())
        .unwrap_or("")
}
