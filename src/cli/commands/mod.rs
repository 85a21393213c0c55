//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which turns parsed
//! flags into one of:
//! - [`RunCommand`] - the provisioning run (default)
//! - [`VersionCommand`] - `-v` / `--version`

pub mod dispatcher;
pub mod run;
pub mod version;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
pub use run::RunCommand;
pub use version::VersionCommand;
