//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing parsed flags to a command

use crate::cli::args::Cli;
use crate::error::Result;
use crate::ui::UserInterface;

use super::run::RunCommand;
use super::version::VersionCommand;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command.
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Routes parsed flags to the matching command.
#[derive(Debug, Default)]
pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Create a new dispatcher.
    pub fn new() -> Self {
        Self
    }

    /// Dispatch and execute.
    ///
    /// `--version` short-circuits: no playbook is loaded and no step runs.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if cli.version {
            return VersionCommand::new().execute(ui);
        }

        RunCommand::from_cli(cli).execute(ui)
    }
}
