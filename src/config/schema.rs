//! Playbook schema definitions.
//!
//! This module contains the struct definitions that map to the YAML
//! playbook format.
//!
//! ```yaml
//! settings:
//!   repo_name: platform
//! vars:
//!   repo_url: git@github.com:acme/platform.git
//! steps:
//!   - name: homebrew
//!     check: { on_path: brew }
//!     command: /bin/bash -c "$(curl -fsSL https://brew.sh/install.sh)"
//!   - name: bin_on_path
//!     lines:
//!       - line: export PATH="${bin_dir}:$PATH"
//!         confirm: { prompt: "Add ${bin_dir} to PATH?", default: true }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root structure of a playbook file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Playbook {
    /// Settings that feed environment defaults.
    pub settings: Settings,

    /// Extra interpolation variables.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, String>,

    /// Steps, in execution order.
    pub steps: Vec<StepConfig>,
}

/// Playbook-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory name of the cloned repository under `~/src`.
    pub repo_name: String,

    /// Domain used to build the default contact email.
    pub email_domain: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            repo_name: "workspace".to_string(),
            email_domain: "example.com".to_string(),
        }
    }
}

/// A step as written in the playbook.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StepConfig {
    /// Unique step name.
    pub name: String,

    /// Display title (defaults to the name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Precondition; when satisfied the step is skipped.
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "serde_yaml::with::singleton_map_recursive"
    )]
    pub check: Option<CheckConfig>,

    /// Gate asked before the step runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm: Option<ConfirmConfig>,

    /// Shell command action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Profile lines action.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<LineConfig>,

    /// Environment assertion action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expect: Option<ExpectConfig>,

    /// One-shot recovery command run when the action fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recover: Option<String>,

    /// Working directory for the action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workdir: Option<String>,
}

/// Precondition as written in the playbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckConfig {
    /// Command exits 0.
    CommandSucceeds(String),
    /// File or directory exists.
    FileExists(String),
    /// Executable is on `PATH`.
    OnPath(String),
    /// Line is present in the shell profile.
    ProfileContains(String),
    /// Every nested check passes.
    All(Vec<CheckConfig>),
    /// At least one nested check passes.
    Any(Vec<CheckConfig>),
}

/// Yes/no gate with a default answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfirmConfig {
    /// Question shown to the user.
    pub prompt: String,

    /// Answer used when the user just presses enter, or in non-interactive runs.
    #[serde(default)]
    pub default: bool,
}

/// A profile line, optionally gated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineConfig {
    /// Line to append.
    pub line: String,

    /// Gate for this line only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm: Option<ConfirmConfig>,
}

/// Assert that a command prints an expected value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpectConfig {
    /// Command whose last line of output is compared.
    pub command: String,

    /// Expected value.
    pub equals: String,

    /// Manual command that fixes a mismatch.
    pub remedy: String,

    /// What is being checked, for messages (defaults to the command).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_playbook() {
        let yaml = r#"
steps:
  - name: hello
    command: echo hello
"#;
        let playbook: Playbook = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(playbook.steps.len(), 1);
        assert_eq!(playbook.steps[0].name, "hello");
        assert_eq!(playbook.settings.repo_name, "workspace");
    }

    #[test]
    fn parses_nested_checks() {
        let yaml = r#"
steps:
  - name: brew
    check:
      any:
        - on_path: brew
        - file_exists: /opt/homebrew/bin/brew
    command: install-brew
"#;
        let playbook: Playbook = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            playbook.steps[0].check,
            Some(CheckConfig::Any(vec![
                CheckConfig::OnPath("brew".to_string()),
                CheckConfig::FileExists("/opt/homebrew/bin/brew".to_string()),
            ]))
        );
    }

    #[test]
    fn parses_gated_lines() {
        let yaml = r#"
steps:
  - name: path
    lines:
      - line: export PATH="$HOME/bin:$PATH"
        confirm:
          prompt: Add bin to PATH?
          default: true
      - line: alias k=kubectl
"#;
        let playbook: Playbook = serde_yaml::from_str(yaml).unwrap();
        let lines = &playbook.steps[0].lines;
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0].confirm,
            Some(ConfirmConfig {
                prompt: "Add bin to PATH?".to_string(),
                default: true,
            })
        );
        assert!(lines[1].confirm.is_none());
    }

    #[test]
    fn confirm_default_is_no() {
        let yaml = "prompt: Continue?";
        let confirm: ConfirmConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(!confirm.default);
    }

    #[test]
    fn rejects_unknown_step_fields() {
        let yaml = r#"
steps:
  - name: hello
    comand: echo typo
"#;
        assert!(serde_yaml::from_str::<Playbook>(yaml).is_err());
    }
}
