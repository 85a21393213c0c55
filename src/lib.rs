//! workstation - idempotent, resumable developer machine provisioning.
//!
//! A playbook declares an ordered list of steps. Each step has an optional
//! precondition, an optional confirmation gate and an action. Re-running is
//! always safe: satisfied steps are skipped, and the version marker is only
//! written once every step is done or skipped.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Playbook loading, validation and interpolation
//! - [`environment`] - Resolved, overridable provisioning parameters
//! - [`error`] - Error types and result aliases
//! - [`profile`] - Append-only shell profile
//! - [`runner`] - The provisioning loop
//! - [`shell`] - Shell command execution
//! - [`state`] - The version marker
//! - [`steps`] - Step descriptors, checks and actions
//! - [`ui`] - Prompts, spinners, and terminal output
//!
//! # Example
//!
//! ```
//! use tempfile::TempDir;
//! use workstation::profile::MemoryProfile;
//! use workstation::runner::{RunOptions, RunState, Runner};
//! use workstation::shell::MockExecutor;
//! use workstation::state::{MarkerStatus, VersionMarker};
//! use workstation::steps::{Check, Step};
//! use workstation::ui::MockUI;
//! # use std::collections::HashMap;
//! # use workstation::config::Settings;
//! # use workstation::environment::Environment;
//!
//! let home = TempDir::new().unwrap();
//! let env = Environment::resolve(&HashMap::new(), &Settings::default(), home.path());
//! let steps = vec![Step::command("homebrew", "install-brew")
//!     .with_check(Check::CommandSucceeds("brew --version".into()))];
//!
//! let mut executor = MockExecutor::new();
//! executor.on_success_satisfies("install-brew", "brew --version");
//! let mut profile = MemoryProfile::new();
//! let mut ui = MockUI::new();
//! let marker = VersionMarker::for_home(home.path());
//!
//! let mut state = RunState::new(env);
//! Runner::new(&mut executor, &mut profile, RunOptions::default())
//!     .run(&steps, &mut state, &marker, &mut ui)
//!     .unwrap();
//!
//! assert!(state.completed);
//! assert!(matches!(marker.read().unwrap(), MarkerStatus::Version(_)));
//! ```

pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod profile;
pub mod runner;
pub mod shell;
pub mod state;
pub mod steps;
pub mod ui;

pub use error::{Result, WorkstationError};
