//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct. There are no subcommands:
//! with no flags the full provisioning sequence runs.

use clap::Parser;
use std::path::PathBuf;

/// workstation - provision a developer machine, idempotently.
#[derive(Debug, Default, Parser)]
#[command(name = "workstation")]
#[command(author, about, long_about = None)]
pub struct Cli {
    /// Print the version and exit
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    /// Path to the playbook (overrides WORKSTATION_CONFIG and ~/.workstation/playbook.yml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Accept every confirmation default, never prompt
    #[arg(short = 'y', long = "yes", visible_alias = "non-interactive")]
    pub yes: bool,

    /// Report which steps would run without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Show command output as it runs
    #[arg(long)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}
