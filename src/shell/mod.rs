//! Shell command execution and platform detection.

pub mod command;
pub mod mock;
pub mod platform;

pub use command::{execute, CommandOptions, CommandResult, Executor, ShellExecutor};
pub use mock::MockExecutor;
pub use platform::{
    default_profile, detect_shell, find_on_path, is_ci, is_elevated, machine_arch, ShellType,
};
