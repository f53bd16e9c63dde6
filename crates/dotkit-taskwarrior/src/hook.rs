use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use tracing::{debug, warn};

use dotkit_config::schema::TaskwarriorConfig;
use dotkit_core::{CommandRunner, CommandSpec, DotkitError, Result, run_checked};

use crate::hooks;
use crate::task::Task;

/// The two tasks Taskwarrior writes to an on-modify hook's stdin.
#[derive(Debug, Clone)]
pub struct HookInput {
    pub before: Task,
    pub after: Task,
}

impl HookInput {
    /// Read the "before" and "after" lines.
    pub fn read<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut next_line = |which: &str| -> Result<Task> {
            let mut line = String::new();
            let n = reader.read_line(&mut line)?;
            if n == 0 || line.trim().is_empty() {
                return Err(DotkitError::Hook(format!("missing {which} task on stdin")));
            }
            Task::parse(&line)
        };
        let before = next_line("before")?;
        let after = next_line("after")?;
        Ok(Self { before, after })
    }

    pub fn new(before: Task, after: Task) -> Self {
        Self { before, after }
    }

    /// Task transitioned from not running to running.
    pub fn started(&self) -> bool {
        !self.before.is_started() && self.after.is_started()
    }

    /// Task transitioned from running to not running.
    pub fn stopped(&self) -> bool {
        self.before.is_started() && !self.after.is_started()
    }

    pub fn tag_added(&self, tag: &str) -> bool {
        !self.before.has_tag(tag) && self.after.has_tag(tag)
    }

    pub fn tag_removed(&self, tag: &str) -> bool {
        self.before.has_tag(tag) && !self.after.has_tag(tag)
    }
}

/// A side effect a hook asks for. Run after the task has been printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookAction {
    /// Start a detached process.
    Spawn(CommandSpec),
    /// Raise and maximize the first visible window of this class.
    FocusWindow { class_name: String },
}

/// What a hook hands back to Taskwarrior.
#[derive(Debug, Clone)]
pub struct HookOutcome {
    pub task: Task,
    /// Lines shown to the user after the task JSON.
    pub feedback: Vec<String>,
    pub actions: Vec<HookAction>,
}

impl HookOutcome {
    pub fn unchanged(task: Task) -> Self {
        Self {
            task,
            feedback: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// The hook's stdout: the task JSON line, then any feedback.
    pub fn render(&self) -> String {
        let mut out = self.task.to_json();
        out.push('\n');
        for line in &self.feedback {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    StartedLabel,
    ReviewLabel,
    Priority,
    CompletedCleanup,
    Tmuxinator,
    Launcher,
    /// Every hook except `review-label`, which `priority` supersedes.
    All,
}

impl HookKind {
    pub const ALL: [HookKind; 7] = [
        HookKind::StartedLabel,
        HookKind::ReviewLabel,
        HookKind::Priority,
        HookKind::CompletedCleanup,
        HookKind::Tmuxinator,
        HookKind::Launcher,
        HookKind::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HookKind::StartedLabel => "started-label",
            HookKind::ReviewLabel => "review-label",
            HookKind::Priority => "priority",
            HookKind::CompletedCleanup => "completed-cleanup",
            HookKind::Tmuxinator => "tmuxinator",
            HookKind::Launcher => "launcher",
            HookKind::All => "all",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookKind {
    type Err = DotkitError;

    fn from_str(s: &str) -> Result<Self> {
        HookKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = HookKind::ALL.iter().map(|k| k.as_str()).collect();
                DotkitError::InvalidInput(format!(
                    "unknown hook '{s}' (expected one of: {})",
                    names.join(", ")
                ))
            })
    }
}

/// Run one hook (or the whole chain) over the input.
pub fn run_hook(kind: HookKind, input: &HookInput, config: &TaskwarriorConfig) -> HookOutcome {
    debug!(hook = %kind, description = input.after.description(), "running hook");
    match kind {
        HookKind::StartedLabel => hooks::started_label(input, config),
        HookKind::ReviewLabel => hooks::review_label(input, config),
        HookKind::Priority => hooks::priority(input, config),
        HookKind::CompletedCleanup => hooks::completed_cleanup(input, config),
        HookKind::Tmuxinator => hooks::tmuxinator(input, config),
        HookKind::Launcher => hooks::launcher(input, config),
        HookKind::All => hooks::all(input, config),
    }
}

/// Carry out the side effects a hook requested.
///
/// The task has already been accepted by the time this runs, so failures
/// are logged rather than returned.
pub async fn execute_actions(actions: &[HookAction], runner: &dyn CommandRunner) {
    for action in actions {
        let result = match action {
            HookAction::Spawn(spec) => runner.spawn(spec).await,
            HookAction::FocusWindow { class_name } => focus_window(class_name, runner).await,
        };
        if let Err(e) = result {
            warn!(?action, error = %e, "hook action failed");
        }
    }
}

async fn focus_window(class_name: &str, runner: &dyn CommandRunner) -> Result<()> {
    let search = CommandSpec::new("xdotool").args(["search", "--onlyvisible", "--class", class_name]);
    let ids = run_checked(runner, &search).await?;
    let Some(id) = ids.split_whitespace().next() else {
        debug!(class_name, "no visible window");
        return Ok(());
    };
    runner
        .spawn(&CommandSpec::new("xdotool").args(["windowactivate", "--sync", id]))
        .await?;
    runner
        .spawn(&CommandSpec::new("xdotool").args([
            "windowactivate",
            id,
            "windowsize",
            id,
            "100%",
            "100%",
        ]))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_two_lines() {
        let input = HookInput::read(Cursor::new(
            "{\"description\":\"a\"}\n{\"description\":\"a\",\"start\":\"20241017T080000Z\"}\n",
        ))
        .unwrap();
        assert!(input.started());
        assert!(!input.stopped());
    }

    #[test]
    fn test_read_missing_after_line() {
        let err = HookInput::read(Cursor::new("{\"description\":\"a\"}\n")).unwrap_err();
        assert!(err.to_string().contains("missing after task"));
    }

    #[test]
    fn test_hook_kind_names_roundtrip() {
        for kind in HookKind::ALL {
            assert_eq!(kind.as_str().parse::<HookKind>().unwrap(), kind);
        }
        assert!("nope".parse::<HookKind>().is_err());
    }

    #[test]
    fn test_render_puts_feedback_after_json() {
        let mut outcome = HookOutcome::unchanged(Task::parse("{\"a\":1}").unwrap());
        outcome.feedback.push("done".into());
        assert_eq!(outcome.render(), "{\"a\":1}\ndone\n");
    }
}
