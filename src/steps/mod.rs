//! Provisioning steps.
//!
//! - [`Step`] - a named unit of work, resolved from the playbook
//! - [`Check`] - precondition deciding whether the work is already done
//! - [`Action`] - the work itself (command, profile lines, assertion)
//! - [`StepStatus`] / [`StepRecord`] - what happened to each step
//!
//! # Example
//!
//! ```
//! use workstation::steps::{Check, ProfileLine, Step};
//!
//! let brew = Step::command("homebrew", "install-homebrew")
//!     .with_check(Check::OnPath("brew".to_string()))
//!     .with_recover("xcode-select --install");
//!
//! let path = Step::profile(
//!     "bin_on_path",
//!     vec![ProfileLine::new("export PATH=\"$HOME/.local/bin:$PATH\"")
//!         .confirm("Add ~/.local/bin to PATH?", true)],
//! );
//!
//! assert!(brew.precondition().is_some());
//! assert!(path.precondition().is_some());
//! ```

pub mod action;
pub mod check;
pub mod status;
pub mod step;

pub use action::{ensure_success, Action, ActionContext, ActionOutcome, Expectation, ProfileLine};
pub use check::{Check, CheckResult, Probes};
pub use status::{SkipReason, StepRecord, StepStatus};
pub use step::{Confirmation, Step};

use crate::config::{InterpolationContext, Playbook};
use crate::environment::Environment;
use crate::error::Result;

/// Interpolation context for a playbook run in `env`.
pub fn interpolation_context(playbook: &Playbook, env: &Environment) -> InterpolationContext {
    let mut ctx = InterpolationContext::new();
    ctx.builtins.extend(env.variables());
    ctx.with_vars(playbook.vars.clone())
}

/// Resolve every playbook step, in declared order.
pub fn build_steps(playbook: &Playbook, env: &Environment) -> Result<Vec<Step>> {
    let ctx = interpolation_context(playbook, env);
    playbook
        .steps
        .iter()
        .map(|config| Step::from_config(config, &ctx, &env.home))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_playbook, Settings};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    fn env() -> Environment {
        let mut vars = HashMap::new();
        vars.insert("USER".to_string(), "ada".to_string());
        vars.insert("SHELL".to_string(), "/bin/zsh".to_string());
        Environment::resolve(&vars, &Settings::default(), Path::new("/home/ada"))
    }

    #[test]
    fn builds_steps_in_order() {
        let playbook = parse_playbook(
            r#"
vars:
  greeting: hello
steps:
  - name: first
    command: echo ${greeting} ${username} ${version}
  - name: second
    check: { file_exists: "~/.ssh/id_ed25519" }
    command: ssh-keygen -t ed25519 -C ${email}
"#,
            Path::new("test.yml"),
        )
        .unwrap();

        let steps = build_steps(&playbook, &env()).unwrap();
        let names: Vec<_> = steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["first", "second"]);
        assert_eq!(
            steps[0].action,
            Action::Command(format!("echo hello ada {}", env!("CARGO_PKG_VERSION")))
        );
        assert_eq!(
            steps[1].check,
            Some(Check::FileExists(PathBuf::from("/home/ada/.ssh/id_ed25519")))
        );
    }

    #[test]
    fn profile_variable_points_at_shell_rc() {
        let playbook = parse_playbook(
            "steps:\n  - name: show\n    command: cat ${profile}\n",
            Path::new("test.yml"),
        )
        .unwrap();
        let steps = build_steps(&playbook, &env()).unwrap();
        assert_eq!(
            steps[0].action,
            Action::Command("cat /home/ada/.zshrc".to_string())
        );
    }
}
