//! Provisioning scenarios against scripted capabilities.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::TempDir;
use workstation::config::Settings;
use workstation::environment::Environment;
use workstation::profile::{FileProfile, MemoryProfile, ProfileStore};
use workstation::runner::{RunOptions, RunState, Runner};
use workstation::shell::{CommandOptions, CommandResult, Executor, MockExecutor};
use workstation::state::{MarkerStatus, VersionMarker};
use workstation::steps::{Check, ProfileLine, SkipReason, Step, StepStatus};
use workstation::ui::MockUI;
use workstation::{Result, WorkstationError};

/// Tests in this file that change the working directory take this lock.
static CWD: Mutex<()> = Mutex::new(());

fn environment(home: &Path) -> Environment {
    let mut vars = HashMap::new();
    vars.insert("USER".to_string(), "ada".to_string());
    Environment::resolve(&vars, &Settings::default(), home)
}

/// Ten steps, each installing a tool that its check then finds.
fn ten_steps(executor: &mut MockExecutor) -> Vec<Step> {
    (1..=10)
        .map(|i| {
            let install = format!("install-tool-{}", i);
            let probe = format!("tool-{} --version", i);
            executor.on_success_satisfies(&install, &probe);
            Step::command(format!("tool-{}", i), install)
                .with_check(Check::CommandSucceeds(probe))
        })
        .collect()
}

fn run(
    steps: &[Step],
    home: &Path,
    executor: &mut dyn Executor,
    profile: &mut dyn ProfileStore,
    ui: &mut MockUI,
) -> (Result<()>, RunState) {
    let mut state = RunState::new(environment(home));
    let marker = VersionMarker::for_home(home);
    let result = Runner::new(executor, profile, RunOptions::default())
        .run(steps, &mut state, &marker, ui)
        .map(|_| ());
    (result, state)
}

fn marker(home: &Path) -> MarkerStatus {
    VersionMarker::for_home(home).read().unwrap()
}

#[test]
fn fresh_machine_runs_every_step_and_records_version() {
    let home = TempDir::new().unwrap();
    let mut executor = MockExecutor::new();
    let steps = ten_steps(&mut executor);
    let mut profile = MemoryProfile::new();
    let mut ui = MockUI::new();

    let (result, state) = run(&steps, home.path(), &mut executor, &mut profile, &mut ui);

    result.unwrap();
    assert!(state.completed);
    assert_eq!(executor.actions().len(), 10);
    assert!(state.records.iter().all(|r| r.status == StepStatus::Done));
    assert_eq!(marker(home.path()), MarkerStatus::Version("1.3.10".into()));
}

#[test]
fn second_run_invokes_no_actions() {
    let home = TempDir::new().unwrap();
    let mut executor = MockExecutor::new();
    let steps = ten_steps(&mut executor);
    let mut profile = MemoryProfile::new();
    let mut ui = MockUI::new();

    run(&steps, home.path(), &mut executor, &mut profile, &mut ui).0.unwrap();
    let marker_path = VersionMarker::for_home(home.path()).path().to_path_buf();
    let written = std::fs::read_to_string(&marker_path).unwrap();
    let actions_after_first = executor.actions().len();

    ui.clear();
    let (result, state) = run(&steps, home.path(), &mut executor, &mut profile, &mut ui);

    result.unwrap();
    assert_eq!(executor.actions().len(), actions_after_first);
    assert!(state
        .records
        .iter()
        .all(|r| matches!(r.skip_reason, Some(SkipReason::Satisfied(_)))));
    assert_eq!(std::fs::read_to_string(&marker_path).unwrap(), written);
    assert!(ui.has_message("Last successful provisioning: 1.3.10"));
}

#[test]
fn step_five_failing_stops_the_run() {
    let home = TempDir::new().unwrap();
    let mut executor = MockExecutor::new();
    let steps = ten_steps(&mut executor);
    executor.fail("install-tool-5");
    let mut profile = MemoryProfile::new();
    let mut ui = MockUI::new();

    let (result, state) = run(&steps, home.path(), &mut executor, &mut profile, &mut ui);

    let err = result.unwrap_err();
    assert!(err.to_string().starts_with("Provisioning failed at step 'tool-5'"));
    assert_eq!(
        executor.actions(),
        [
            "install-tool-1",
            "install-tool-2",
            "install-tool-3",
            "install-tool-4",
            "install-tool-5"
        ]
    );
    assert_eq!(state.records.len(), 5);
    assert_eq!(state.records[4].status, StepStatus::Failed);
    assert!(!state.completed);
    assert_eq!(marker(home.path()), MarkerStatus::Missing);
    assert_eq!(
        ui.summaries()[0].headline(),
        "Stopped at step 'tool-5' after 5 of 10 steps"
    );
}

#[test]
fn rerun_after_failure_resumes_where_it_stopped() {
    let home = TempDir::new().unwrap();
    let mut executor = MockExecutor::new();
    let steps = ten_steps(&mut executor);
    executor.fail_times("install-tool-5", 1);
    let mut profile = MemoryProfile::new();
    let mut ui = MockUI::new();

    assert!(run(&steps, home.path(), &mut executor, &mut profile, &mut ui)
        .0
        .is_err());
    let (result, state) = run(&steps, home.path(), &mut executor, &mut profile, &mut ui);

    result.unwrap();
    let skipped = state
        .records
        .iter()
        .filter(|r| r.status == StepStatus::Skipped)
        .count();
    assert_eq!(skipped, 4);
    // Steps 1-4 once, step 5 twice, steps 6-10 once.
    assert_eq!(executor.actions().len(), 11);
    assert_eq!(marker(home.path()), MarkerStatus::Version("1.3.10".into()));
}

#[test]
fn steps_run_in_declared_order() {
    let home = TempDir::new().unwrap();
    let mut executor = MockExecutor::new();
    let steps = vec![
        Step::command("c", "third-alphabetically"),
        Step::command("a", "first-alphabetically"),
        Step::command("b", "second-alphabetically"),
    ];
    let mut profile = MemoryProfile::new();
    let mut ui = MockUI::new();

    run(&steps, home.path(), &mut executor, &mut profile, &mut ui).0.unwrap();

    assert_eq!(
        executor.actions(),
        [
            "third-alphabetically",
            "first-alphabetically",
            "second-alphabetically"
        ]
    );
    let names: Vec<_> = ui.steps().iter().map(|(i, n, _)| (*i, *n)).collect();
    assert_eq!(names, vec![(1, 3), (2, 3), (3, 3)]);
}

/// Executor whose clone really creates the repository, and which notes
/// whether the repository existed when later commands ran.
struct Cloner {
    inner: MockExecutor,
    repo: PathBuf,
    repo_seen: Vec<(String, bool)>,
}

impl Executor for Cloner {
    fn run(&mut self, command: &str, options: &CommandOptions) -> Result<CommandResult> {
        self.repo_seen
            .push((command.to_string(), self.repo.join(".git").is_dir()));
        if command == "git clone" {
            std::fs::create_dir_all(self.repo.join(".git"))?;
        }
        self.inner.run(command, options)
    }

    fn probe(&mut self, command: &str) -> Result<bool> {
        self.inner.probe(command)
    }
}

#[test]
fn earlier_step_effects_exist_before_later_step_starts() {
    let _lock = CWD.lock().unwrap_or_else(|e| e.into_inner());
    let home = TempDir::new().unwrap();
    let repo = home.path().join("src").join("workspace");
    let mut executor = Cloner {
        inner: MockExecutor::new(),
        repo: repo.clone(),
        repo_seen: Vec::new(),
    };
    let steps = vec![
        Step::command("clone", "git clone").with_check(Check::FileExists(repo.join(".git"))),
        Step::command("bootstrap", "bin/setup")
            .with_check(Check::FileExists(repo.join(".bootstrapped")))
            .with_workdir(&repo),
    ];
    let mut profile = MemoryProfile::new();
    let mut ui = MockUI::new();

    let (result, state) = run(&steps, home.path(), &mut executor, &mut profile, &mut ui);

    result.unwrap();
    assert_eq!(
        executor.repo_seen,
        vec![("git clone".to_string(), false), ("bin/setup".to_string(), true)]
    );
    assert_eq!(
        executor.inner.cwds()[1].as_ref().unwrap().canonicalize().unwrap(),
        repo.canonicalize().unwrap()
    );
    assert!(state.records.iter().all(|r| r.status == StepStatus::Done));
}

#[test]
fn profile_with_foreign_bytes_is_appended_to() {
    let home = TempDir::new().unwrap();
    let path = home.path().join(".bashrc");
    std::fs::write(&path, b"export NAME=Jos\xe9\n").unwrap();
    let mut executor = MockExecutor::new();
    let mut profile = FileProfile::new(&path);
    let steps = vec![Step::profile("p", vec![ProfileLine::new("export EDITOR=vim")])];
    let mut ui = MockUI::new();

    let (result, state) = run(&steps, home.path(), &mut executor, &mut profile, &mut ui);

    result.unwrap();
    assert_eq!(state.records[0].status, StepStatus::Done);
    assert_eq!(
        std::fs::read(&path).unwrap(),
        b"export NAME=Jos\xe9\nexport EDITOR=vim\n".to_vec()
    );

    let (again, state) = run(&steps, home.path(), &mut executor, &mut profile, &mut ui);
    again.unwrap();
    assert_eq!(state.records[0].status, StepStatus::Skipped);
}

#[test]
fn profile_lines_are_never_duplicated() {
    let home = TempDir::new().unwrap();
    let mut executor = MockExecutor::new();
    let line = "export PATH=\"$HOME/.local/bin:$PATH\"";
    let steps = vec![Step::profile(
        "bin_on_path",
        vec![
            ProfileLine::new(line),
            ProfileLine::new("eval \"$(brew shellenv)\""),
        ],
    )];
    let mut profile = MemoryProfile::with_lines(&[line]);
    let mut ui = MockUI::new();

    run(&steps, home.path(), &mut executor, &mut profile, &mut ui).0.unwrap();
    run(&steps, home.path(), &mut executor, &mut profile, &mut ui).0.unwrap();

    assert_eq!(profile.count(line), 1);
    assert_eq!(profile.count("eval \"$(brew shellenv)\""), 1);
    assert!(executor.actions().is_empty());
}

#[test]
fn declined_line_is_skipped_and_asked_again_next_run() {
    let home = TempDir::new().unwrap();
    let mut executor = MockExecutor::new();
    let prompt = "Add ~/.local/bin to PATH?";
    let steps = vec![Step::profile(
        "bin_on_path",
        vec![
            ProfileLine::new("export EDITOR=vim"),
            ProfileLine::new("export PATH=\"$HOME/.local/bin:$PATH\"").confirm(prompt, true),
        ],
    )];
    let mut profile = MemoryProfile::new();
    let mut ui = MockUI::new();
    ui.set_confirm_response(prompt, false);

    let (result, state) = run(&steps, home.path(), &mut executor, &mut profile, &mut ui);

    result.unwrap();
    assert_eq!(state.records[0].status, StepStatus::Done);
    assert_eq!(profile.lines(), ["export EDITOR=vim"]);

    ui.clear();
    run(&steps, home.path(), &mut executor, &mut profile, &mut ui).0.unwrap();
    assert!(ui.was_confirmed(prompt));
}

#[test]
fn satisfied_gate_is_not_asked() {
    let home = TempDir::new().unwrap();
    let mut executor = MockExecutor::new();
    executor.satisfy("test -f ~/.ssh/id_ed25519");
    let steps = vec![Step::command("ssh", "ssh-keygen")
        .with_check(Check::CommandSucceeds("test -f ~/.ssh/id_ed25519".into()))
        .with_confirm("Generate a new SSH key?", true)];
    let mut profile = MemoryProfile::new();
    let mut ui = MockUI::new();

    run(&steps, home.path(), &mut executor, &mut profile, &mut ui).0.unwrap();

    assert!(ui.confirms().is_empty());
    assert!(executor.actions().is_empty());
}

#[test]
fn declined_step_still_writes_marker() {
    let home = TempDir::new().unwrap();
    let mut executor = MockExecutor::new();
    let steps = vec![
        Step::command("ssh", "ssh-keygen").with_confirm("Generate a new SSH key?", true),
        Step::command("after", "echo after"),
    ];
    let mut profile = MemoryProfile::new();
    let mut ui = MockUI::new();
    ui.set_confirm_response("Generate a new SSH key?", false);

    let (result, state) = run(&steps, home.path(), &mut executor, &mut profile, &mut ui);

    result.unwrap();
    assert_eq!(state.records[0].skip_reason, Some(SkipReason::Declined));
    assert_eq!(executor.actions(), ["echo after"]);
    assert_eq!(marker(home.path()), MarkerStatus::Version("1.3.10".into()));
}

/// Executor whose probes cannot be spawned.
#[derive(Default)]
struct BrokenProbes {
    inner: MockExecutor,
}

impl Executor for BrokenProbes {
    fn run(&mut self, command: &str, options: &CommandOptions) -> Result<CommandResult> {
        self.inner.run(command, options)
    }

    fn probe(&mut self, command: &str) -> Result<bool> {
        Err(WorkstationError::CommandFailed {
            command: command.to_string(),
            code: None,
        })
    }
}

#[test]
fn unevaluable_precondition_counts_as_not_satisfied() {
    let home = TempDir::new().unwrap();
    let mut executor = BrokenProbes::default();
    let steps = vec![Step::command("git", "brew install git")
        .with_check(Check::CommandSucceeds("git --version".into()))];
    let mut profile = MemoryProfile::new();
    let mut ui = MockUI::new();

    run(&steps, home.path(), &mut executor, &mut profile, &mut ui).0.unwrap();

    assert_eq!(executor.inner.actions(), ["brew install git"]);
}

#[test]
fn working_directory_is_restored_after_failure() {
    let _lock = CWD.lock().unwrap_or_else(|e| e.into_inner());
    let home = TempDir::new().unwrap();
    let repo = home.path().join("src").join("workspace");
    std::fs::create_dir_all(&repo).unwrap();
    let before = std::env::current_dir().unwrap();

    let mut executor = MockExecutor::new();
    executor.fail("bin/setup");
    let steps = vec![
        Step::command("bootstrap", "bin/setup").with_workdir(&repo),
        Step::command("after", "echo after"),
    ];
    let mut profile = MemoryProfile::new();
    let mut ui = MockUI::new();

    let (result, _) = run(&steps, home.path(), &mut executor, &mut profile, &mut ui);

    assert!(result.is_err());
    assert_eq!(std::env::current_dir().unwrap(), before);
    assert_eq!(
        executor.cwds()[0].as_ref().unwrap().canonicalize().unwrap(),
        repo.canonicalize().unwrap()
    );
}

#[test]
fn working_directory_is_restored_after_success() {
    let _lock = CWD.lock().unwrap_or_else(|e| e.into_inner());
    let home = TempDir::new().unwrap();
    let before = std::env::current_dir().unwrap();

    let mut executor = MockExecutor::new();
    let steps = vec![
        Step::command("inside", "make").with_workdir(home.path()),
        Step::command("outside", "pwd"),
    ];
    let mut profile = MemoryProfile::new();
    let mut ui = MockUI::new();

    run(&steps, home.path(), &mut executor, &mut profile, &mut ui).0.unwrap();

    assert_eq!(std::env::current_dir().unwrap(), before);
    assert_eq!(executor.cwds()[1].as_deref(), Some(before.as_path()));
}

#[test]
fn successful_recovery_counts_as_done() {
    let home = TempDir::new().unwrap();
    let mut executor = MockExecutor::new();
    executor.fail("brew install node");
    let steps = vec![Step::command("node", "brew install node").with_recover("brew link node")];
    let mut profile = MemoryProfile::new();
    let mut ui = MockUI::new();

    let (result, state) = run(&steps, home.path(), &mut executor, &mut profile, &mut ui);

    result.unwrap();
    assert_eq!(executor.actions(), ["brew install node", "brew link node"]);
    assert!(state.records[0].recovered);
    assert!(ui.has_warning("brew link node"));
    assert_eq!(marker(home.path()), MarkerStatus::Version("1.3.10".into()));
}
