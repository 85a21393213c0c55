//! Scoped working directory.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Changes the process working directory and restores it on drop.
///
/// The previous directory is restored on every exit path: normal return,
/// `?` propagation and unwinding.
///
/// # Example
///
/// ```
/// use workstation::runner::WorkdirGuard;
///
/// let before = std::env::current_dir().unwrap();
/// let target = std::env::temp_dir();
/// {
///     let _guard = WorkdirGuard::enter(&target).unwrap();
///     assert_eq!(
///         std::env::current_dir().unwrap().canonicalize().unwrap(),
///         target.canonicalize().unwrap()
///     );
/// }
/// assert_eq!(std::env::current_dir().unwrap(), before);
/// ```
#[derive(Debug)]
pub struct WorkdirGuard {
    previous: PathBuf,
}

impl WorkdirGuard {
    /// Enter `dir`.
    pub fn enter(dir: &Path) -> Result<Self> {
        let previous = env::current_dir()?;
        env::set_current_dir(dir)?;
        tracing::debug!("Entered {}", dir.display());
        Ok(Self { previous })
    }

    /// Directory that will be restored.
    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for WorkdirGuard {
    fn drop(&mut self) {
        match env::set_current_dir(&self.previous) {
            Ok(()) => tracing::debug!("Returned to {}", self.previous.display()),
            Err(e) => tracing::warn!(
                "Could not return to {}: {}",
                self.previous.display(),
                e
            ),
        }
    }
}

/// Serializes tests that change the process working directory.
#[cfg(test)]
pub(crate) static CWD_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
