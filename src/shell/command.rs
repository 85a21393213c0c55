//! Shell command execution.
//!
//! Every external collaborator a step invokes (package managers, source
//! control, language installers) is reached through the [`Executor`] trait
//! so the runner can be driven by a fake in tests.

use crate::error::{Result, WorkstationError};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Result of executing a shell command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }

    /// Combined stdout and stderr, for error reporting.
    pub fn combined_output(&self) -> String {
        let mut out = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&self.stderr);
        }
        out
    }
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Capture stdout (if false, inherits from parent).
    pub capture_stdout: bool,

    /// Capture stderr (if false, inherits from parent).
    pub capture_stderr: bool,
}

impl CommandOptions {
    /// Options that capture both output streams.
    pub fn captured() -> Self {
        Self {
            capture_stdout: true,
            capture_stderr: true,
        }
    }
}

/// Capability for invoking external actions.
///
/// `run` is used for step actions and recovery commands, `probe` for
/// side-effect-free precondition checks. Keeping them apart lets callers
/// count install invocations separately from checks.
pub trait Executor {
    /// Run a command that may change machine state.
    fn run(&mut self, command: &str, options: &CommandOptions) -> Result<CommandResult>;

    /// Run a read-only check and report whether it exited successfully.
    fn probe(&mut self, command: &str) -> Result<bool>;
}

/// Executor backed by the user's login shell.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellExecutor;

impl ShellExecutor {
    /// Create a new shell executor.
    pub fn new() -> Self {
        Self
    }
}

impl Executor for ShellExecutor {
    fn run(&mut self, command: &str, options: &CommandOptions) -> Result<CommandResult> {
        tracing::debug!("Running: {}", command);
        execute(command, options)
    }

    fn probe(&mut self, command: &str) -> Result<bool> {
        tracing::debug!("Probing: {}", command);
        execute(command, &CommandOptions::captured()).map(|r| r.success)
    }
}

/// Execute a shell command.
pub fn execute(command: &str, options: &CommandOptions) -> Result<CommandResult> {
    let start = Instant::now();

    let shell = detect_shell();

    let mut cmd = Command::new(&shell);
    cmd.arg(shell_flag());
    cmd.arg(command);

    if options.capture_stdout {
        cmd.stdout(Stdio::piped());
    } else {
        cmd.stdout(Stdio::inherit());
    }

    if options.capture_stderr {
        cmd.stderr(Stdio::piped());
    } else {
        cmd.stderr(Stdio::inherit());
    }

    let output = cmd.output().map_err(|_| WorkstationError::CommandFailed {
        command: command.to_string(),
        code: None,
    })?;

    let duration = start.elapsed();

    let stdout = if options.capture_stdout {
        String::from_utf8_lossy(&output.stdout).to_string()
    } else {
        String::new()
    };

    let stderr = if options.capture_stderr {
        String::from_utf8_lossy(&output.stderr).to_string()
    } else {
        String::new()
    };

    if output.status.success() {
        Ok(CommandResult::success(stdout, stderr, duration))
    } else {
        Ok(CommandResult::failure(
            output.status.code(),
            stdout,
            stderr,
            duration,
        ))
    }
}

fn detect_shell() -> String {
    if cfg!(target_os = "windows") {
        std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string())
    } else {
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
    }
}

/// Login, non-interactive: tools activated in the login profile (brew
/// shellenv, version managers) are on PATH without job-control prompts.
fn shell_flag() -> &'static str {
    if cfg!(target_os = "windows") {
        "/C"
    } else {
        "-lc"
    }
}
