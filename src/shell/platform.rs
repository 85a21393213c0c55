//! Platform-specific shell detection.

use std::path::{Path, PathBuf};

/// Known shell types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellType {
    Bash,
    Zsh,
    Fish,
    Unknown,
}

impl ShellType {
    /// Parse shell type from executable name.
    pub fn from_executable(exe: &str) -> Self {
        let name = Path::new(exe)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        match name.as_str() {
            "bash" => ShellType::Bash,
            "zsh" => ShellType::Zsh,
            "fish" => ShellType::Fish,
            _ => ShellType::Unknown,
        }
    }

    /// The rc file that new lines should be appended to, relative to home.
    pub fn profile_file(self) -> &'static str {
        match self {
            ShellType::Bash => ".bashrc",
            ShellType::Zsh => ".zshrc",
            ShellType::Fish => ".config/fish/config.fish",
            ShellType::Unknown => ".profile",
        }
    }
}

/// Detect the login shell from a `SHELL` value.
pub fn detect_shell(shell_var: Option<&str>) -> ShellType {
    shell_var
        .map(ShellType::from_executable)
        .unwrap_or(ShellType::Unknown)
}

/// Default profile path for the given shell under `home`.
pub fn default_profile(home: &Path, shell: ShellType) -> PathBuf {
    home.join(shell.profile_file())
}

/// Machine hardware identifier, in `uname -m` spelling.
pub fn machine_arch() -> &'static str {
    match (std::env::consts::OS, std::env::consts::ARCH) {
        ("macos", "aarch64") => "arm64",
        (_, arch) => arch,
    }
}

/// Search `path_var` (a `PATH`-style list) for an executable named `binary`.
pub fn find_on_path(binary: &str, path_var: &str) -> Option<PathBuf> {
    std::env::split_paths(path_var)
        .map(|dir| dir.join(binary))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Check if running in a CI environment.
///
/// Checks common CI environment variables: `CI`, `GITHUB_ACTIONS`,
/// `GITLAB_CI`, `CIRCLECI`, `TRAVIS`, `JENKINS_URL`.
pub fn is_ci() -> bool {
    ci_detected(|name| std::env::var_os(name).is_some())
}

const CI_VARIABLES: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "TRAVIS",
    "JENKINS_URL",
];

fn ci_detected(is_set: impl Fn(&str) -> bool) -> bool {
    CI_VARIABLES.iter().any(|name| is_set(name))
}

/// Check if running as root.
pub fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid() is a simple syscall that returns the effective user ID
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn shell_type_from_executable() {
        assert_eq!(ShellType::from_executable("/bin/bash"), ShellType::Bash);
        assert_eq!(ShellType::from_executable("/usr/bin/zsh"), ShellType::Zsh);
        assert_eq!(ShellType::from_executable("/usr/bin/fish"), ShellType::Fish);
        assert_eq!(ShellType::from_executable("tcsh"), ShellType::Unknown);
    }

    #[test]
    fn detect_shell_defaults_to_unknown() {
        assert_eq!(detect_shell(None), ShellType::Unknown);
        assert_eq!(detect_shell(Some("/bin/zsh")), ShellType::Zsh);
    }

    #[test]
    fn default_profile_per_shell() {
        let home = Path::new("/home/dev");
        assert_eq!(
            default_profile(home, ShellType::Zsh),
            PathBuf::from("/home/dev/.zshrc")
        );
        assert_eq!(
            default_profile(home, ShellType::Bash),
            PathBuf::from("/home/dev/.bashrc")
        );
        assert_eq!(
            default_profile(home, ShellType::Unknown),
            PathBuf::from("/home/dev/.profile")
        );
    }

    #[test]
    fn machine_arch_is_not_empty() {
        assert!(!machine_arch().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn find_on_path_locates_executables_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let tool = temp.path().join("mytool");
        fs::write(&tool, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();
        fs::write(temp.path().join("notes"), "").unwrap();

        let path_var = temp.path().to_string_lossy().to_string();
        assert_eq!(find_on_path("mytool", &path_var), Some(tool));
        assert_eq!(find_on_path("notes", &path_var), None);
        assert_eq!(find_on_path("missing", &path_var), None);
    }

    #[test]
    fn ci_detected_from_any_known_variable() {
        assert!(!ci_detected(|_| false));
        assert!(ci_detected(|name| name == "GITHUB_ACTIONS"));
        assert!(ci_detected(|name| name == "JENKINS_URL"));
        assert!(!ci_detected(|name| name == "HOME"));
    }
}
