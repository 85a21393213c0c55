//! The provisioning loop.

use std::time::{Duration, Instant};

use crate::error::{Result, WorkstationError};
use crate::profile::ProfileStore;
use crate::shell::{CommandOptions, Executor};
use crate::state::{MarkerStatus, VersionMarker};
use crate::steps::{
    Action, ActionContext, ActionOutcome, Probes, SkipReason, Step, StepRecord, StepStatus,
};
use crate::ui::{OutputMode, RunSummary, UserInterface};

use super::recovery::run_recovery;
use super::state::RunState;
use super::workdir::WorkdirGuard;

/// Options for a run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Evaluate preconditions only; run no actions and write no marker.
    pub dry_run: bool,
}

/// Runs steps in order against the machine.
///
/// Each step's precondition is evaluated first; satisfied steps are
/// skipped without side effects. The first fatal error stops the run and
/// leaves the version marker untouched. The marker is written only when
/// every step ended done or skipped.
pub struct Runner<'a> {
    executor: &'a mut dyn Executor,
    profile: &'a mut dyn ProfileStore,
    options: RunOptions,
}

impl<'a> Runner<'a> {
    /// Create a runner over the given capabilities.
    pub fn new(
        executor: &'a mut dyn Executor,
        profile: &'a mut dyn ProfileStore,
        options: RunOptions,
    ) -> Self {
        Self {
            executor,
            profile,
            options,
        }
    }

    /// Run `steps` in order.
    ///
    /// The summary is shown through `ui` on success and on failure.
    ///
    /// # Errors
    ///
    /// `ProvisioningFailed` wrapping the first fatal step error. Failing to
    /// write the marker after every step completed is also an error.
    pub fn run(
        &mut self,
        steps: &[Step],
        state: &mut RunState,
        marker: &VersionMarker,
        ui: &mut dyn UserInterface,
    ) -> Result<RunSummary> {
        let total = steps.len();
        ui.show_header(&format!("workstation {}", state.version));
        self.report_previous(marker, ui);

        for (index, step) in steps.iter().enumerate() {
            ui.show_step(index + 1, total, &step.title);

            if let Err(error) = self.run_step(step, state, ui) {
                state.completed = false;
                let summary = self.summary(state, total, false);
                ui.show_summary(&summary);
                return Err(WorkstationError::stopped_at(&step.name, error));
            }
        }

        state.completed = !self.options.dry_run && state.all_complete(total);

        let mut marker_written = false;
        if state.completed {
            marker.write(&state.version)?;
            tracing::info!("Wrote {} to {}", state.version, marker.path().display());
            marker_written = true;
        }

        let summary = self.summary(state, total, marker_written);
        ui.show_summary(&summary);
        Ok(summary)
    }

    fn report_previous(&self, marker: &VersionMarker, ui: &mut dyn UserInterface) {
        match marker.read() {
            Ok(MarkerStatus::Missing) => {
                tracing::debug!("No previous provisioning recorded");
                ui.message("No previous successful provisioning recorded");
            }
            Ok(MarkerStatus::Version(version)) => {
                ui.message(&format!("Last successful provisioning: {}", version));
            }
            Ok(MarkerStatus::Unreadable(contents)) => {
                ui.warning(&format!(
                    "Ignoring unreadable version marker at {} ({:?}); it is rewritten after a successful run",
                    marker.path().display(),
                    contents
                ));
            }
            Err(e) => {
                ui.warning(&format!(
                    "Could not read version marker at {}: {}",
                    marker.path().display(),
                    e
                ));
            }
        }
    }

    fn run_step(
        &mut self,
        step: &Step,
        state: &mut RunState,
        ui: &mut dyn UserInterface,
    ) -> Result<()> {
        if let Some(reason) = self.satisfied(step, state) {
            tracing::debug!("Skipping '{}': {}", step.name, reason);
            ui.skipped(&reason);
            state.record(StepRecord::skipped(&step.name, SkipReason::Satisfied(reason)));
            return Ok(());
        }

        if self.options.dry_run {
            let plan = planned_work(&step.action);
            ui.message(&format!("  would run: {}", plan));
            state.record(StepRecord::planned(&step.name, plan));
            return Ok(());
        }

        if let Some(gate) = &step.confirm {
            if !ui.confirm(&gate.prompt, gate.default)? {
                tracing::debug!("Declined '{}'", step.name);
                ui.skipped("declined");
                state.record(StepRecord::skipped(&step.name, SkipReason::Declined));
                return Ok(());
            }
        }

        let start = Instant::now();
        match self.act(step, ui) {
            Ok((outcome, recovered)) => {
                let duration = start.elapsed();
                let mut record = StepRecord::done(&step.name, duration, outcome.detail());
                if recovered {
                    record = record.with_recovery();
                }
                if !step.action.is_command() {
                    ui.success(&done_message(step, duration, &outcome));
                }
                state.record(record);
                Ok(())
            }
            Err(error) => {
                state.record(StepRecord::failed(
                    &step.name,
                    start.elapsed(),
                    error.to_string(),
                ));
                show_failure(step, &error, ui);
                Err(error)
            }
        }
    }

    /// Whether the step's precondition already holds.
    ///
    /// A precondition that cannot be evaluated counts as not satisfied.
    fn satisfied(&mut self, step: &Step, state: &RunState) -> Option<String> {
        let check = step.precondition()?;
        let mut probes = Probes {
            executor: &mut *self.executor,
            profile: &*self.profile,
            search_path: &state.environment.search_path,
        };

        match check.evaluate(&mut probes) {
            Ok(result) if result.complete => Some(result.description),
            Ok(result) => {
                tracing::debug!("'{}' not satisfied: {}", step.name, result.description);
                None
            }
            Err(e) => {
                let error = WorkstationError::PreconditionCheck {
                    step: step.name.clone(),
                    message: e.to_string(),
                };
                tracing::warn!("{}", error);
                None
            }
        }
    }

    /// Perform the action inside the step's working directory. When it fails
    /// and the step names a recovery command, a successful recovery completes
    /// the step.
    fn act(&mut self, step: &Step, ui: &mut dyn UserInterface) -> Result<(ActionOutcome, bool)> {
        let _guard = match &step.workdir {
            Some(dir) => Some(WorkdirGuard::enter(dir).map_err(|e| {
                WorkstationError::ActionFailed {
                    step: step.name.clone(),
                    message: format!("cannot enter {}: {}", dir.display(), e),
                    code: None,
                    output: None,
                }
            })?),
            None => None,
        };

        let options = command_options(ui.output_mode());
        tracing::debug!("{}: {} -> {}", step.name, StepStatus::Pending, StepStatus::Running);

        match (self.attempt(step, ui, &options), step.recover.as_deref()) {
            (Ok(outcome), _) => Ok((outcome, false)),
            (Err(error), Some(recover)) if error.is_recoverable() => {
                tracing::debug!(
                    "{}: {} -> {}",
                    step.name,
                    StepStatus::Running,
                    StepStatus::Recovering
                );
                ui.warning(&format!("{}, trying `{}`", error, recover));

                run_recovery(&step.name, recover, &mut *self.executor, ui, &options)?;
                Ok((ActionOutcome::default(), true))
            }
            (Err(error), _) => Err(error),
        }
    }

    fn attempt(
        &mut self,
        step: &Step,
        ui: &mut dyn UserInterface,
        options: &CommandOptions,
    ) -> Result<ActionOutcome> {
        let mut spinner = match &step.action {
            Action::Command(command) if ui.output_mode().shows_spinners() => {
                Some(ui.start_spinner(&format!("Running `{}`", command)))
            }
            _ => None,
        };

        let start = Instant::now();
        let mut ctx = ActionContext {
            executor: &mut *self.executor,
            profile: &mut *self.profile,
            ui: &mut *ui,
        };
        let result = step.action.perform(&step.name, &mut ctx, options);

        if let Some(spinner) = spinner.as_mut() {
            let elapsed = crate::ui::format_duration(start.elapsed());
            match &result {
                Ok(_) => spinner.finish_success(&format!("{} ({})", step.title, elapsed)),
                Err(_) => spinner.finish_error(&format!("{} failed ({})", step.title, elapsed)),
            }
        } else if result.is_ok() && step.action.is_command() {
            ui.success(&format!(
                "{} ({})",
                step.title,
                crate::ui::format_duration(start.elapsed())
            ));
        }

        result
    }

    fn summary(&self, state: &RunState, total: usize, marker_written: bool) -> RunSummary {
        RunSummary {
            version: state.version.clone(),
            records: state.records.clone(),
            total_steps: total,
            elapsed: state.elapsed(),
            dry_run: self.options.dry_run,
            marker_written,
        }
    }
}

/// Captured output unless the user asked to see it live.
fn command_options(mode: OutputMode) -> CommandOptions {
    if mode.shows_command_output() {
        CommandOptions::default()
    } else {
        CommandOptions::captured()
    }
}

fn planned_work(action: &Action) -> String {
    match action {
        Action::Command(command) => command.clone(),
        Action::Profile(lines) => match lines.len() {
            1 => "append 1 profile line".to_string(),
            n => format!("append {} profile lines", n),
        },
        Action::Expect(expectation) => format!("check {}", expectation.subject),
    }
}

fn done_message(step: &Step, duration: Duration, outcome: &ActionOutcome) -> String {
    let elapsed = crate::ui::format_duration(duration);
    match outcome.detail() {
        Some(detail) => format!("{} ({}, {})", step.title, elapsed, detail),
        None => format!("{} ({})", step.title, elapsed),
    }
}

fn show_failure(step: &Step, error: &WorkstationError, ui: &mut dyn UserInterface) {
    let command = match &step.action {
        Action::Command(command) => command.as_str(),
        Action::Expect(expectation) => expectation.command.as_str(),
        Action::Profile(_) => "append to profile",
    };

    match error {
        WorkstationError::EnvironmentMismatch {
            expected,
            found,
            remedy,
            ..
        } => {
            let output = format!("expected: {}\nfound:    {}", expected, found);
            ui.show_error_block(command, &output, Some(remedy.as_str()));
        }
        other => ui.show_error_block(command, other.output().unwrap_or_default(), None),
    }
}
