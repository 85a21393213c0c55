//! Environment resolution.
//!
//! Every parameter is resolved with the priority chain:
//! 1. `WORKSTATION_*` variable from the process environment
//! 2. Computed default (from `$USER`, the machine, the playbook settings)
//!
//! The result is an immutable [`Environment`] that is handed to every step,
//! so no step reads ambient global state on its own.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::{EnvLayer, EnvLayerStack, Settings};
use crate::shell::{default_profile, detect_shell, machine_arch};

/// Parameter names paired with the variable that overrides them.
pub const OVERRIDES: &[(&str, &str)] = &[
    ("username", "WORKSTATION_USER"),
    ("arch", "WORKSTATION_ARCH"),
    ("email", "WORKSTATION_EMAIL"),
    ("full_name", "WORKSTATION_NAME"),
    ("repo_path", "WORKSTATION_REPO_DIR"),
    ("bin_dir", "WORKSTATION_BIN_DIR"),
    ("profile", "WORKSTATION_PROFILE"),
];

/// Source label for values taken from the process environment.
pub const SOURCE_OVERRIDE: &str = "environment";

/// Source label for computed defaults.
pub const SOURCE_DEFAULT: &str = "default";

/// Resolved provisioning parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    /// Operator username.
    pub username: String,
    /// Machine hardware identifier (`uname -m` spelling).
    pub arch: String,
    /// Contact email.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Home directory.
    pub home: PathBuf,
    /// Local path of the cloned repository.
    pub repo_path: PathBuf,
    /// Local binary install directory.
    pub bin_dir: PathBuf,
    /// Shell profile that receives appended lines.
    pub profile_path: PathBuf,
    /// `PATH` used for `on_path` checks.
    pub search_path: String,
    sources: HashMap<String, String>,
}

impl Environment {
    /// Resolve from an explicit variable map.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use std::path::Path;
    /// use workstation::config::Settings;
    /// use workstation::environment::Environment;
    ///
    /// let mut vars = HashMap::new();
    /// vars.insert("USER".to_string(), "ada".to_string());
    /// vars.insert("WORKSTATION_EMAIL".to_string(), "ada@acme.dev".to_string());
    ///
    /// let env = Environment::resolve(&vars, &Settings::default(), Path::new("/home/ada"));
    /// assert_eq!(env.username, "ada");
    /// assert_eq!(env.email, "ada@acme.dev");
    /// assert_eq!(env.source_of("email"), Some("environment"));
    /// assert_eq!(env.bin_dir, Path::new("/home/ada/.local/bin"));
    /// ```
    pub fn resolve(process: &HashMap<String, String>, settings: &Settings, home: &Path) -> Self {
        let overrides = EnvLayer::from_process(SOURCE_OVERRIDE, process, OVERRIDES);

        // Username first: several defaults are derived from it.
        let username = overrides
            .get("username")
            .map(str::to_string)
            .unwrap_or_else(|| default_username(process));

        let mut defaults = EnvLayer::new(SOURCE_DEFAULT);
        defaults.set("username", username.as_str());
        defaults.set("arch", machine_arch());
        defaults.set("email", format!("{}@{}", username, settings.email_domain));
        defaults.set("full_name", username.as_str());
        defaults.set(
            "repo_path",
            home.join("src").join(&settings.repo_name).display().to_string(),
        );
        defaults.set(
            "bin_dir",
            home.join(".local").join("bin").display().to_string(),
        );
        let shell = detect_shell(process.get("SHELL").map(String::as_str));
        defaults.set("profile", default_profile(home, shell).display().to_string());

        let mut stack = EnvLayerStack::new();
        stack.push(defaults);
        stack.push(overrides);

        let value = |key: &str| stack.get(key).unwrap_or_default().to_string();
        let path = |key: &str| expand_home(stack.get(key).unwrap_or_default(), home);

        let sources = OVERRIDES
            .iter()
            .filter_map(|(key, _)| {
                stack
                    .source_of(key)
                    .map(|source| (key.to_string(), source.to_string()))
            })
            .collect();

        let env = Self {
            username: value("username"),
            arch: value("arch"),
            email: value("email"),
            full_name: value("full_name"),
            home: home.to_path_buf(),
            repo_path: path("repo_path"),
            bin_dir: path("bin_dir"),
            profile_path: path("profile"),
            search_path: process.get("PATH").cloned().unwrap_or_default(),
            sources,
        };

        let resolved = env.variables();
        for (key, _) in OVERRIDES {
            tracing::debug!(
                "{} = {} ({})",
                key,
                resolved.get(*key).map(String::as_str).unwrap_or(""),
                env.source_of(key).unwrap_or(SOURCE_DEFAULT)
            );
        }

        env
    }

    /// Where the value of `key` came from.
    pub fn source_of(&self, key: &str) -> Option<&str> {
        self.sources.get(key).map(String::as_str)
    }

    /// Values exposed to playbook interpolation.
    pub fn variables(&self) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("username".to_string(), self.username.clone());
        vars.insert("arch".to_string(), self.arch.clone());
        vars.insert("email".to_string(), self.email.clone());
        vars.insert("full_name".to_string(), self.full_name.clone());
        vars.insert("home".to_string(), self.home.display().to_string());
        vars.insert("repo_path".to_string(), self.repo_path.display().to_string());
        vars.insert("bin_dir".to_string(), self.bin_dir.display().to_string());
        vars.insert("profile".to_string(), self.profile_path.display().to_string());
        vars
    }
}

fn default_username(process: &HashMap<String, String>) -> String {
    ["USER", "USERNAME", "LOGNAME"]
        .iter()
        .filter_map(|var| process.get(*var))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .unwrap_or("user")
        .to_string()
}

fn expand_home(value: &str, home: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde_with_context(value, || home.to_str()).into_owned())
}
