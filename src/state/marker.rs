//! The version marker file.
//!
//! `~/.workstation/version` holds a single `MAJOR.MINOR.PATCH` line naming
//! the runner version that last provisioned the machine to completion. It
//! is informational: nothing skips work because of it.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::STATE_DIR;
use crate::error::{Result, WorkstationError};

/// Current version of the runner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// File name of the marker inside the state directory.
pub const MARKER_FILE: &str = "version";

static SEMVER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("valid semver pattern"));

/// Whether `value` is a plain `MAJOR.MINOR.PATCH` version.
pub fn is_semver(value: &str) -> bool {
    SEMVER.is_match(value)
}

/// What the marker currently says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerStatus {
    /// No marker: the machine was never provisioned to completion.
    Missing,
    /// A valid version.
    Version(String),
    /// A marker whose content is not a version.
    Unreadable(String),
}

impl fmt::Display for MarkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "never"),
            Self::Version(v) => write!(f, "{}", v),
            Self::Unreadable(content) => write!(f, "unreadable ({:?})", content),
        }
    }
}

/// Handle on the marker file.
#[derive(Debug, Clone)]
pub struct VersionMarker {
    path: PathBuf,
}

impl VersionMarker {
    /// Marker at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Marker for the user whose home directory is `home`.
    pub fn for_home(home: &Path) -> Self {
        Self::new(home.join(STATE_DIR).join(MARKER_FILE))
    }

    /// Path of the marker file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the marker.
    pub fn read(&self) -> Result<MarkerStatus> {
        if !self.path.exists() {
            return Ok(MarkerStatus::Missing);
        }

        let content = fs::read_to_string(&self.path)?;
        let value = content.trim();
        if is_semver(value) {
            Ok(MarkerStatus::Version(value.to_string()))
        } else {
            Ok(MarkerStatus::Unreadable(value.to_string()))
        }
    }

    /// Persist `version`, replacing whatever was there.
    ///
    /// Written to a temporary file and renamed into place, so an
    /// interrupted write never leaves a half-written marker.
    pub fn write(&self, version: &str) -> Result<()> {
        if !is_semver(version) {
            return Err(WorkstationError::ConfigValidationError {
                message: format!("'{}' is not a MAJOR.MINOR.PATCH version", version),
            });
        }

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, format!("{}\n", version))?;
        fs::rename(&temp_path, &self.path)?;

        tracing::debug!("Wrote version marker {} to {}", version, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn crate_version_is_semver() {
        assert!(is_semver(VERSION));
    }

    #[test]
    fn semver_rejects_other_shapes() {
        assert!(is_semver("1.3.10"));
        assert!(!is_semver("1.3"));
        assert!(!is_semver("v1.3.10"));
        assert!(!is_semver("1.3.10-beta"));
        assert!(!is_semver(""));
    }

    #[test]
    fn missing_marker() {
        let temp = TempDir::new().unwrap();
        let marker = VersionMarker::for_home(temp.path());
        assert_eq!(marker.read().unwrap(), MarkerStatus::Missing);
        assert_eq!(marker.read().unwrap().to_string(), "never");
    }

    #[test]
    fn write_then_read() {
        let temp = TempDir::new().unwrap();
        let marker = VersionMarker::for_home(temp.path());

        marker.write("1.3.10").unwrap();

        assert_eq!(
            fs::read_to_string(temp.path().join(".workstation/version")).unwrap(),
            "1.3.10\n"
        );
        assert_eq!(
            marker.read().unwrap(),
            MarkerStatus::Version("1.3.10".to_string())
        );
        assert!(!marker.path().with_extension("tmp").exists());
    }

    #[test]
    fn garbage_is_unreadable_and_overwritten() {
        let temp = TempDir::new().unwrap();
        let marker = VersionMarker::for_home(temp.path());
        fs::create_dir_all(marker.path().parent().unwrap()).unwrap();
        fs::write(marker.path(), "not a version").unwrap();

        assert_eq!(
            marker.read().unwrap(),
            MarkerStatus::Unreadable("not a version".to_string())
        );

        marker.write("1.3.10").unwrap();
        assert_eq!(
            marker.read().unwrap(),
            MarkerStatus::Version("1.3.10".to_string())
        );
    }

    #[test]
    fn refuses_to_write_non_versions() {
        let temp = TempDir::new().unwrap();
        let marker = VersionMarker::for_home(temp.path());
        assert!(marker.write("latest").is_err());
        assert!(!marker.path().exists());
    }
}
