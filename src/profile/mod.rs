//! Shell profile as a managed, append-only resource.
//!
//! Steps never rewrite the profile. They ask whether a line is already
//! present and append it when it is not, so re-running the playbook can
//! not duplicate entries.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Capability for reading and appending profile lines.
pub trait ProfileStore {
    /// Whether `line` is already present (ignoring surrounding whitespace).
    fn contains(&self, line: &str) -> Result<bool>;

    /// Append `line` on its own line.
    fn append(&mut self, line: &str) -> Result<()>;

    /// Human-readable location, for messages.
    fn location(&self) -> String;
}

/// Profile backed by a file on disk.
#[derive(Debug, Clone)]
pub struct FileProfile {
    path: PathBuf,
}

impl FileProfile {
    /// Create a profile handle for `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the profile file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileStore for FileProfile {
    fn contains(&self, line: &str) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        // Profiles may hold bytes in any encoding; only our lines need to be UTF-8.
        let bytes = fs::read(&self.path)?;
        let content = String::from_utf8_lossy(&bytes);
        Ok(content.lines().any(|l| same_line(l, line)))
    }

    fn append(&mut self, line: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let needs_newline = fs::read(&self.path)
            .map(|bytes| !bytes.is_empty() && !bytes.ends_with(b"\n"))
            .unwrap_or(false);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if needs_newline {
            writeln!(file)?;
        }
        writeln!(file, "{}", line.trim_end())?;

        tracing::debug!("Appended to {}: {}", self.path.display(), line);
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory profile, for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryProfile {
    lines: Vec<String>,
}

impl MemoryProfile {
    /// Create an empty profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a profile that already holds `lines`.
    pub fn with_lines(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    /// All lines, in order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of times `line` occurs.
    pub fn count(&self, line: &str) -> usize {
        self.lines.iter().filter(|l| same_line(l, line)).count()
    }
}

impl ProfileStore for MemoryProfile {
    fn contains(&self, line: &str) -> Result<bool> {
        Ok(self.count(line) > 0)
    }

    fn append(&mut self, line: &str) -> Result<()> {
        self.lines.push(line.trim_end().to_string());
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}

fn same_line(existing: &str, wanted: &str) -> bool {
    existing.trim() == wanted.trim()
}
