//! Run command implementation.
//!
//! Loads the playbook, resolves the environment and hands the steps to the
//! [`Runner`](crate::runner::Runner).

use std::collections::HashMap;
use std::path::PathBuf;

use crate::cli::args::Cli;
use crate::config::{load_playbook, PlaybookSource};
use crate::environment::Environment;
use crate::error::{Result, WorkstationError};
use crate::profile::FileProfile;
use crate::runner::{RunOptions, RunState, Runner};
use crate::shell::{is_elevated, ShellExecutor};
use crate::state::VersionMarker;
use crate::steps::build_steps;
use crate::ui::{OutputMode, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The run command implementation.
pub struct RunCommand {
    config: Option<PathBuf>,
    dry_run: bool,
    process: HashMap<String, String>,
    home: Option<PathBuf>,
}

impl RunCommand {
    /// Create a run command from parsed flags, reading the process environment.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            config: cli.config.clone(),
            dry_run: cli.dry_run,
            process: std::env::vars().collect(),
            home: dirs::home_dir(),
        }
    }

    /// Create a run command against an explicit environment and home directory.
    pub fn with_process(
        config: Option<PathBuf>,
        dry_run: bool,
        process: HashMap<String, String>,
        home: PathBuf,
    ) -> Self {
        Self {
            config,
            dry_run,
            process,
            home: Some(home),
        }
    }

    fn home(&self) -> Result<&PathBuf> {
        self.home
            .as_ref()
            .ok_or_else(|| WorkstationError::ConfigValidationError {
                message: "Could not determine home directory".to_string(),
            })
    }

    fn show_environment(&self, env: &Environment, source: &PlaybookSource, ui: &mut dyn UserInterface) {
        ui.message(&format!("Playbook: {}", source));
        let vars = env.variables();
        let mut keys: Vec<_> = vars.keys().collect();
        keys.sort();
        for key in keys {
            ui.message(&format!(
                "  {} = {} ({})",
                key,
                vars[key],
                env.source_of(key).unwrap_or("derived")
            ));
        }
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let home = self.home()?;
        let source = PlaybookSource::discover(self.config.as_deref(), &self.process, home);
        tracing::debug!("Playbook source: {}", source);

        let playbook = match load_playbook(&source) {
            Ok(playbook) => playbook,
            Err(e) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(1));
            }
        };

        let env = Environment::resolve(&self.process, &playbook.settings, home);
        let steps = match build_steps(&playbook, &env) {
            Ok(steps) => steps,
            Err(e) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(1));
            }
        };

        if ui.output_mode() == OutputMode::Verbose || self.dry_run {
            self.show_environment(&env, &source, ui);
        }
        if self.dry_run {
            ui.message("Dry run: checking preconditions only, no actions will run");
        }
        if is_elevated() {
            ui.warning("Running as root: installed files will be owned by root");
        }

        let marker = VersionMarker::for_home(&env.home);
        let mut executor = ShellExecutor::new();
        let mut profile = FileProfile::new(env.profile_path.clone());
        let mut state = RunState::new(env);
        tracing::info!(
            "Provisioning {} steps as {} on {}",
            steps.len(),
            state.environment.username,
            state.environment.arch
        );

        let mut runner = Runner::new(
            &mut executor,
            &mut profile,
            RunOptions {
                dry_run: self.dry_run,
            },
        );

        match runner.run(&steps, &mut state, &marker, ui) {
            Ok(_) => Ok(CommandResult::success()),
            Err(e @ WorkstationError::ProvisioningFailed { .. }) => {
                tracing::error!("{}", e);
                ui.error(&e.to_string());
                Ok(CommandResult::failure(1))
            }
            Err(e) => Err(e),
        }
    }
}
