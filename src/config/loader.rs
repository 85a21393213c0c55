//! Playbook discovery and loading.
//!
//! The playbook is looked up in this order, first match wins:
//! 1. `--config <PATH>`
//! 2. `WORKSTATION_CONFIG`
//! 3. `~/.workstation/playbook.yml`
//! 4. The default playbook compiled into the binary

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::Playbook;
use crate::config::validator::validate;
use crate::error::{Result, WorkstationError};

/// Variable naming an explicit playbook path.
pub const PLAYBOOK_ENV: &str = "WORKSTATION_CONFIG";

/// Per-user directory holding the playbook and the version marker.
pub const STATE_DIR: &str = ".workstation";

/// File name of the per-user playbook.
pub const USER_PLAYBOOK: &str = "playbook.yml";

/// Playbook shipped with the binary.
pub const DEFAULT_PLAYBOOK: &str = include_str!("../../playbook/default.yml");

/// Where the playbook comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybookSource {
    /// Passed with `--config`.
    Flag(PathBuf),
    /// Named by `WORKSTATION_CONFIG`.
    Env(PathBuf),
    /// Found at `~/.workstation/playbook.yml`.
    User(PathBuf),
    /// Compiled-in default.
    Builtin,
}

impl PlaybookSource {
    /// Pick the playbook source for this invocation.
    pub fn discover(flag: Option<&Path>, process: &HashMap<String, String>, home: &Path) -> Self {
        if let Some(path) = flag {
            return Self::Flag(path.to_path_buf());
        }

        if let Some(value) = process.get(PLAYBOOK_ENV).filter(|v| !v.trim().is_empty()) {
            let expanded = shellexpand::tilde_with_context(value.trim(), || home.to_str());
            return Self::Env(PathBuf::from(expanded.into_owned()));
        }

        let user = home.join(STATE_DIR).join(USER_PLAYBOOK);
        if user.is_file() {
            return Self::User(user);
        }

        Self::Builtin
    }

    /// Path of the playbook file, if it is not the built-in one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Flag(p) | Self::Env(p) | Self::User(p) => Some(p),
            Self::Builtin => None,
        }
    }
}

impl fmt::Display for PlaybookSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(p) => write!(f, "{} (--config)", p.display()),
            Self::Env(p) => write!(f, "{} ({})", p.display(), PLAYBOOK_ENV),
            Self::User(p) => write!(f, "{}", p.display()),
            Self::Builtin => write!(f, "built-in playbook"),
        }
    }
}

/// Read, parse and validate the playbook from `source`.
pub fn load_playbook(source: &PlaybookSource) -> Result<Playbook> {
    let playbook = match source.path() {
        Some(path) => {
            if !path.is_file() {
                return Err(WorkstationError::ConfigNotFound {
                    path: path.to_path_buf(),
                });
            }
            let content = fs::read_to_string(path)?;
            parse_playbook(&content, path)?
        }
        None => parse_playbook(DEFAULT_PLAYBOOK, Path::new("<built-in>"))?,
    };

    validate(&playbook)?;
    tracing::debug!("Loaded {} steps from {}", playbook.steps.len(), source);
    Ok(playbook)
}

/// Parse playbook YAML. `origin` is only used in error messages.
pub fn parse_playbook(content: &str, origin: &Path) -> Result<Playbook> {
    serde_yaml::from_str(content).map_err(|e| WorkstationError::ConfigParseError {
        path: origin.to_path_buf(),
        message: e.to_string(),
    })
}
