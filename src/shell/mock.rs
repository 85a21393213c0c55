//! Mock executor for testing.
//!
//! `MockExecutor` implements [`Executor`] without spawning processes. It
//! records every action and probe, and can simulate installers whose
//! success makes a later check pass.
//!
//! # Example
//!
//! ```
//! use workstation::shell::{CommandOptions, Executor, MockExecutor};
//!
//! let mut executor = MockExecutor::new();
//! executor.on_success_satisfies("install-brew", "brew --version");
//!
//! assert!(!executor.probe("brew --version").unwrap());
//! executor.run("install-brew", &CommandOptions::captured()).unwrap();
//! assert!(executor.probe("brew --version").unwrap());
//! assert_eq!(executor.actions(), ["install-brew"]);
//! ```

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;

use super::command::{CommandOptions, CommandResult, Executor};

/// Scripted executor that captures invocations.
#[derive(Debug, Default)]
pub struct MockExecutor {
    actions: Vec<String>,
    probes: Vec<String>,
    cwds: Vec<Option<PathBuf>>,
    satisfied: HashSet<String>,
    effects: HashMap<String, Vec<String>>,
    failures: HashMap<String, usize>,
    outputs: HashMap<String, String>,
}

impl MockExecutor {
    /// Create an executor where every action succeeds and every probe fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a probe command succeed.
    pub fn satisfy(&mut self, probe: &str) {
        self.satisfied.insert(probe.to_string());
    }

    /// When `action` succeeds, `probe` starts succeeding.
    pub fn on_success_satisfies(&mut self, action: &str, probe: &str) {
        self.effects
            .entry(action.to_string())
            .or_default()
            .push(probe.to_string());
    }

    /// Make `action` fail every time it runs.
    pub fn fail(&mut self, action: &str) {
        self.failures.insert(action.to_string(), usize::MAX);
    }

    /// Make `action` fail for its next `times` runs, then succeed.
    pub fn fail_times(&mut self, action: &str, times: usize) {
        self.failures.insert(action.to_string(), times);
    }

    /// Set the stdout returned by `command`.
    pub fn respond(&mut self, command: &str, stdout: &str) {
        self.outputs.insert(command.to_string(), stdout.to_string());
    }

    /// Actions run, in order.
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    /// Probes evaluated, in order.
    pub fn probes(&self) -> &[String] {
        &self.probes
    }

    /// Process working directory observed at each action.
    pub fn cwds(&self) -> &[Option<PathBuf>] {
        &self.cwds
    }

    /// Check whether an action containing `fragment` was run.
    pub fn ran(&self, fragment: &str) -> bool {
        self.actions.iter().any(|a| a.contains(fragment))
    }

    fn take_failure(&mut self, command: &str) -> bool {
        match self.failures.get_mut(command) {
            Some(remaining) if *remaining == usize::MAX => true,
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

impl Executor for MockExecutor {
    fn run(&mut self, command: &str, _options: &CommandOptions) -> Result<CommandResult> {
        self.actions.push(command.to_string());
        self.cwds.push(std::env::current_dir().ok());

        let stdout = self.outputs.get(command).cloned().unwrap_or_default();

        if self.take_failure(command) {
            return Ok(CommandResult::failure(
                Some(1),
                stdout,
                format!("{}: simulated failure\n", command),
                Duration::ZERO,
            ));
        }

        if let Some(probes) = self.effects.get(command) {
            self.satisfied.extend(probes.iter().cloned());
        }

        Ok(CommandResult::success(stdout, String::new(), Duration::ZERO))
    }

    fn probe(&mut self, command: &str) -> Result<bool> {
        self.probes.push(command.to_string());
        Ok(self.satisfied.contains(command))
    }
}
