//! Step execution.
//!
//! - [`Runner`] - runs steps in declared order, skipping satisfied ones
//! - [`RunState`] - what the current invocation has done so far
//! - [`run_recovery`] - the one-shot recovery a step may declare
//! - [`WorkdirGuard`] - scoped working directory

pub mod provision;
pub mod recovery;
pub mod state;
pub mod workdir;

pub use provision::{RunOptions, Runner};
pub use recovery::run_recovery;
pub use state::RunState;
pub use workdir::WorkdirGuard;
