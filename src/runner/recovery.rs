//! One-shot recovery.
//!
//! A step may name a single recovery command. When its action fails, the
//! command runs once in its place. If it succeeds the step is done; the
//! action is not run again.

use crate::error::Result;
use crate::shell::{CommandOptions, Executor};
use crate::steps::ensure_success;
use crate::ui::UserInterface;

/// Run `command` as the recovery for `step`.
///
/// # Errors
///
/// `ActionFailed` naming the recovery command when it exits non-zero.
pub fn run_recovery(
    step: &str,
    command: &str,
    executor: &mut dyn Executor,
    ui: &mut dyn UserInterface,
    options: &CommandOptions,
) -> Result<()> {
    tracing::info!("Recovering step '{}' with `{}`", step, command);

    let mut spinner = ui.start_spinner(&format!("Recovering with `{}`", command));
    let result = executor.run(command, options)?;

    match ensure_success(step, command, &result) {
        Ok(()) => {
            spinner.finish_success("Recovery succeeded");
            Ok(())
        }
        Err(e) => {
            spinner.finish_error("Recovery failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkstationError;
    use crate::shell::MockExecutor;
    use crate::ui::{MockUI, SpinnerStatus};

    #[test]
    fn successful_recovery() {
        let mut executor = MockExecutor::new();
        let mut ui = MockUI::new();

        run_recovery(
            "node",
            "brew link node",
            &mut executor,
            &mut ui,
            &CommandOptions::captured(),
        )
        .unwrap();

        assert_eq!(executor.actions(), ["brew link node"]);
        assert_eq!(ui.spinner_results()[0].0, SpinnerStatus::Success);
    }

    #[test]
    fn failed_recovery_names_command() {
        let mut executor = MockExecutor::new();
        executor.fail("brew link node");
        let mut ui = MockUI::new();

        let err = run_recovery(
            "node",
            "brew link node",
            &mut executor,
            &mut ui,
            &CommandOptions::captured(),
        )
        .unwrap_err();

        assert!(matches!(err, WorkstationError::ActionFailed { .. }));
        assert!(err.to_string().contains("brew link node"));
        assert_eq!(ui.spinner_results()[0].0, SpinnerStatus::Error);
    }
}
