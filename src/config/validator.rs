//! Playbook validation rules.
//!
//! - Step names are non-empty and unique
//! - Every step has exactly one action (`command`, `lines` or `expect`)
//! - Playbook vars do not shadow built-in variables
//! - Every `${name}` refers to a known variable

use std::collections::HashSet;

use crate::config::interpolation::extract_variables;
use crate::config::schema::{CheckConfig, Playbook, StepConfig};
use crate::error::{Result, WorkstationError};

/// Variables supplied by the runner itself.
pub const BUILTIN_VARIABLES: &[&str] = &[
    "version",
    "username",
    "arch",
    "email",
    "full_name",
    "home",
    "repo_path",
    "bin_dir",
    "profile",
];

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
    /// Step name if error is step-specific
    pub step: Option<String>,
}

impl ValidationError {
    fn new(rule: &str, message: String, step: Option<&str>) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            step: step.map(str::to_string),
        }
    }
}

/// Validate a playbook and return all errors.
///
/// Every error is collected so the user can fix them in one pass.
pub fn validate_playbook(playbook: &Playbook) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_settings(playbook));
    errors.extend(validate_vars(playbook));
    errors.extend(validate_steps(playbook));

    errors
}

fn validate_settings(playbook: &Playbook) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let repo_name = playbook.settings.repo_name.trim();

    if repo_name.is_empty() || repo_name.contains('/') {
        errors.push(ValidationError::new(
            "invalid-repo-name",
            format!(
                "settings.repo_name must be a single directory name, got '{}'",
                playbook.settings.repo_name
            ),
            None,
        ));
    }

    if playbook.settings.email_domain.trim().is_empty() {
        errors.push(ValidationError::new(
            "invalid-email-domain",
            "settings.email_domain must not be empty".to_string(),
            None,
        ));
    }

    errors
}

fn validate_vars(playbook: &Playbook) -> Vec<ValidationError> {
    playbook
        .vars
        .keys()
        .filter(|name| BUILTIN_VARIABLES.contains(&name.as_str()))
        .map(|name| {
            ValidationError::new(
                "reserved-variable",
                format!("Variable '{}' is built in and cannot be redefined", name),
                None,
            )
        })
        .collect()
}

fn validate_steps(playbook: &Playbook) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, step) in playbook.steps.iter().enumerate() {
        let name = step.name.trim();

        if name.is_empty() {
            errors.push(ValidationError::new(
                "missing-name",
                format!("Step #{} has no name", index + 1),
                None,
            ));
            continue;
        }

        if !seen.insert(name) {
            errors.push(ValidationError::new(
                "duplicate-step",
                format!("Step '{}' is defined more than once", name),
                Some(name),
            ));
        }

        let actions = [
            step.command.is_some(),
            !step.lines.is_empty(),
            step.expect.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count();

        match actions {
            0 => errors.push(ValidationError::new(
                "missing-action",
                format!(
                    "Step '{}' must have one of 'command', 'lines' or 'expect'",
                    name
                ),
                Some(name),
            )),
            1 => {}
            _ => errors.push(ValidationError::new(
                "multiple-actions",
                format!(
                    "Step '{}' has more than one of 'command', 'lines' and 'expect'",
                    name
                ),
                Some(name),
            )),
        }

        if let Some(CheckConfig::All(checks) | CheckConfig::Any(checks)) = &step.check {
            if checks.is_empty() {
                errors.push(ValidationError::new(
                    "empty-check",
                    format!("Step '{}' has an empty 'all'/'any' check", name),
                    Some(name),
                ));
            }
        }

        for variable in unknown_variables(step, playbook) {
            errors.push(ValidationError::new(
                "unknown-variable",
                format!("Step '{}' uses unknown variable ${{{}}}", name, variable),
                Some(name),
            ));
        }
    }

    errors
}

fn unknown_variables(step: &StepConfig, playbook: &Playbook) -> Vec<String> {
    let mut unknown: Vec<String> = step_texts(step)
        .into_iter()
        .flat_map(extract_variables)
        .filter(|v| !BUILTIN_VARIABLES.contains(&v.as_str()) && !playbook.vars.contains_key(v))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    unknown.sort();
    unknown
}

/// Every interpolated string in a step.
fn step_texts(step: &StepConfig) -> Vec<&str> {
    let mut texts = Vec::new();

    texts.extend(step.title.as_deref());
    texts.extend(step.command.as_deref());
    texts.extend(step.recover.as_deref());
    texts.extend(step.workdir.as_deref());
    texts.extend(step.confirm.as_ref().map(|c| c.prompt.as_str()));

    for line in &step.lines {
        texts.push(line.line.as_str());
        texts.extend(line.confirm.as_ref().map(|c| c.prompt.as_str()));
    }

    if let Some(expect) = &step.expect {
        texts.push(expect.command.as_str());
        texts.push(expect.equals.as_str());
        texts.push(expect.remedy.as_str());
        texts.extend(expect.subject.as_deref());
    }

    if let Some(check) = &step.check {
        check_texts(check, &mut texts);
    }

    texts
}

fn check_texts<'a>(check: &'a CheckConfig, texts: &mut Vec<&'a str>) {
    match check {
        CheckConfig::CommandSucceeds(s)
        | CheckConfig::FileExists(s)
        | CheckConfig::OnPath(s)
        | CheckConfig::ProfileContains(s) => texts.push(s),
        CheckConfig::All(checks) | CheckConfig::Any(checks) => {
            for check in checks {
                check_texts(check, texts);
            }
        }
    }
}

/// Validate and return Result.
///
/// # Errors
///
/// Returns `ConfigValidationError` if any validation rules fail.
pub fn validate(playbook: &Playbook) -> Result<()> {
    let errors = validate_playbook(playbook);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(WorkstationError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ExpectConfig, LineConfig};

    fn command_step(name: &str, command: &str) -> StepConfig {
        StepConfig {
            name: name.to_string(),
            command: Some(command.to_string()),
            ..Default::default()
        }
    }

    fn playbook(steps: Vec<StepConfig>) -> Playbook {
        Playbook {
            steps,
            ..Default::default()
        }
    }

    fn rules(playbook: &Playbook) -> Vec<String> {
        validate_playbook(playbook)
            .into_iter()
            .map(|e| e.rule)
            .collect()
    }

    #[test]
    fn valid_playbook_returns_no_errors() {
        let book = playbook(vec![
            command_step("one", "echo ${username}"),
            StepConfig {
                name: "two".to_string(),
                lines: vec![LineConfig {
                    line: "export PATH=\"${bin_dir}:$PATH\"".to_string(),
                    confirm: None,
                }],
                ..Default::default()
            },
        ]);
        assert!(validate_playbook(&book).is_empty());
        assert!(validate(&book).is_ok());
    }

    #[test]
    fn rejects_missing_action() {
        let book = playbook(vec![StepConfig {
            name: "empty".to_string(),
            ..Default::default()
        }]);
        assert_eq!(rules(&book), vec!["missing-action"]);
    }

    #[test]
    fn rejects_multiple_actions() {
        let mut step = command_step("both", "true");
        step.expect = Some(ExpectConfig {
            command: "git config user.email".to_string(),
            equals: "${email}".to_string(),
            remedy: "git config --global user.email ${email}".to_string(),
            subject: None,
        });
        assert_eq!(rules(&playbook(vec![step])), vec!["multiple-actions"]);
    }

    #[test]
    fn rejects_duplicate_and_missing_names() {
        let book = playbook(vec![
            command_step("git", "true"),
            command_step("git", "true"),
            command_step("", "true"),
        ]);
        let found = rules(&book);
        assert!(found.contains(&"duplicate-step".to_string()));
        assert!(found.contains(&"missing-name".to_string()));
    }

    #[test]
    fn rejects_unknown_variables() {
        let mut step = command_step("clone", "git clone ${repo_url} ${repo_path}");
        step.check = Some(CheckConfig::FileExists("${repo_path}/${marker}".to_string()));

        let errors = validate_playbook(&playbook(vec![step.clone()]));
        let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Step 'clone' uses unknown variable ${marker}",
                "Step 'clone' uses unknown variable ${repo_url}",
            ]
        );

        let mut book = playbook(vec![step]);
        book.vars.insert("repo_url".to_string(), "git@x:y.git".to_string());
        book.vars.insert("marker".to_string(), ".git".to_string());
        assert!(validate_playbook(&book).is_empty());
    }

    #[test]
    fn escaped_variables_are_not_checked() {
        let book = playbook(vec![command_step("literal", "echo $${not_a_var}")]);
        assert!(validate_playbook(&book).is_empty());
    }

    #[test]
    fn rejects_reserved_vars() {
        let mut book = playbook(vec![command_step("a", "true")]);
        book.vars.insert("username".to_string(), "root".to_string());
        assert_eq!(rules(&book), vec!["reserved-variable"]);
    }

    #[test]
    fn rejects_bad_settings() {
        let mut book = playbook(vec![]);
        book.settings.repo_name = "a/b".to_string();
        book.settings.email_domain = " ".to_string();
        let found = rules(&book);
        assert!(found.contains(&"invalid-repo-name".to_string()));
        assert!(found.contains(&"invalid-email-domain".to_string()));
    }

    #[test]
    fn rejects_empty_composite_check() {
        let mut step = command_step("a", "true");
        step.check = Some(CheckConfig::Any(vec![]));
        assert_eq!(rules(&playbook(vec![step])), vec!["empty-check"]);
    }

    #[test]
    fn validate_joins_messages() {
        let book = playbook(vec![
            StepConfig {
                name: "x".to_string(),
                ..Default::default()
            },
            StepConfig {
                name: "y".to_string(),
                ..Default::default()
            },
        ]);
        let err = validate(&book).unwrap_err();
        assert!(err.to_string().contains("'x'"));
        assert!(err.to_string().contains("'y'"));
    }
}
