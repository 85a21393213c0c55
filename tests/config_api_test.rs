//! Integration tests for playbook discovery and loading.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tempfile::TempDir;
use workstation::config::{
    load_playbook, parse_playbook, PlaybookSource, DEFAULT_PLAYBOOK, PLAYBOOK_ENV,
};
use workstation::environment::Environment;
use workstation::steps::{build_steps, Action};
use workstation::WorkstationError;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn discovery_prefers_flag_then_env_then_user_file() {
    let temp = TempDir::new().unwrap();
    let user = temp.path().join(".workstation").join("playbook.yml");
    write(&user, "steps: []\n");

    let mut process = HashMap::new();
    process.insert(PLAYBOOK_ENV.to_string(), "~/custom.yml".to_string());

    let flag = temp.path().join("flag.yml");
    assert_eq!(
        PlaybookSource::discover(Some(&flag), &process, temp.path()),
        PlaybookSource::Flag(flag.clone())
    );
    assert_eq!(
        PlaybookSource::discover(None, &process, temp.path()),
        PlaybookSource::Env(temp.path().join("custom.yml"))
    );
    assert_eq!(
        PlaybookSource::discover(None, &HashMap::new(), temp.path()),
        PlaybookSource::User(user)
    );
}

#[test]
fn builtin_playbook_when_nothing_else_exists() {
    let temp = TempDir::new().unwrap();
    let source = PlaybookSource::discover(None, &HashMap::new(), temp.path());
    assert_eq!(source, PlaybookSource::Builtin);

    let playbook = load_playbook(&source).unwrap();
    assert!(!playbook.steps.is_empty());
}

#[test]
fn builtin_playbook_builds_for_any_user() {
    let playbook = parse_playbook(DEFAULT_PLAYBOOK, Path::new("<builtin>")).unwrap();

    let mut process = HashMap::new();
    process.insert("USER".to_string(), "grace".to_string());
    process.insert("WORKSTATION_EMAIL".to_string(), "grace@navy.mil".to_string());
    let env = Environment::resolve(&process, &playbook.settings, Path::new("/home/grace"));

    let steps = build_steps(&playbook, &env).unwrap();

    let email = steps
        .iter()
        .find_map(|s| match &s.action {
            Action::Expect(e) => Some(e),
            _ => None,
        })
        .expect("default playbook verifies the git email");
    assert_eq!(email.equals, "grace@navy.mil");
    assert!(steps.iter().any(|s| s.recover.is_some()));
    assert!(steps.iter().any(|s| s.workdir.is_some()));
}

#[test]
fn missing_explicit_playbook_is_not_found() {
    let temp = TempDir::new().unwrap();
    let err = load_playbook(&PlaybookSource::Flag(temp.path().join("missing.yml"))).unwrap_err();
    assert!(matches!(err, WorkstationError::ConfigNotFound { .. }));
}

#[test]
fn malformed_yaml_names_the_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.yml");
    write(&path, "steps: [\n");

    let err = load_playbook(&PlaybookSource::Flag(path.clone())).unwrap_err();
    assert!(matches!(err, WorkstationError::ConfigParseError { .. }));
    assert!(err.to_string().contains("broken.yml"));
}

#[test]
fn unknown_variable_is_rejected_before_running() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("playbook.yml");
    write(
        &path,
        "steps:\n  - name: clone\n    command: git clone ${repo_url}\n",
    );

    let err = load_playbook(&PlaybookSource::Flag(path)).unwrap_err();
    assert!(err.to_string().contains("${repo_url}"));
}
