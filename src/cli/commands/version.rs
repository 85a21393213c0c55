//! Version command implementation.

use crate::error::Result;
use crate::state::VERSION;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Prints the version string. Runs no step and touches no state.
#[derive(Debug, Default)]
pub struct VersionCommand;

impl VersionCommand {
    /// Create a new version command.
    pub fn new() -> Self {
        Self
    }

    /// The line printed by `--version`.
    pub fn version_line() -> String {
        format!("workstation {}", VERSION)
    }
}

impl Command for VersionCommand {
    fn execute(&self, _ui: &mut dyn UserInterface) -> Result<CommandResult> {
        // Printed regardless of --quiet so scripts can read it.
        println!("{}", Self::version_line());
        Ok(CommandResult::success())
    }
}
