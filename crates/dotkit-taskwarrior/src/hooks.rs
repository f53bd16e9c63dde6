//! The on-modify hooks. Each is a pure function of the before/after pair.

use dotkit_config::schema::{LaunchAction, PriorityTag, TaskwarriorConfig};
use dotkit_core::CommandSpec;

use crate::hook::{HookAction, HookInput, HookOutcome};

const PRIORITY_ATTR: &str = "manual_priority";
const REVIEW_PRIORITY: &str = "-1.000000";

/// Tag a task `started` when it starts.
pub fn started_label(input: &HookInput, config: &TaskwarriorConfig) -> HookOutcome {
    let mut task = input.after.clone();
    if input.started() {
        task.add_tag(&config.started_tag);
    }
    HookOutcome::unchanged(task)
}

/// `review` added sets the low manual priority; removing it clears the priority.
pub fn review_label(input: &HookInput, config: &TaskwarriorConfig) -> HookOutcome {
    let priority = config
        .priority_tags
        .iter()
        .find(|p| p.tag == "review")
        .map(|p| p.priority.as_str())
        .unwrap_or(REVIEW_PRIORITY);

    let mut task = input.after.clone();
    if input.tag_added("review") {
        task.set_str(PRIORITY_ATTR, priority);
    } else if input.tag_removed("review") {
        task.remove(PRIORITY_ATTR);
    }
    HookOutcome::unchanged(task)
}

/// Map priority tags to `manual_priority`.
///
/// Rules apply in configured order, so a later tag wins when several are
/// added at once. Removing a tag clears the priority only when no other
/// priority tag is still present.
pub fn priority(input: &HookInput, config: &TaskwarriorConfig) -> HookOutcome {
    let rules: &[PriorityTag] = &config.priority_tags;
    let mut task = input.after.clone();

    for rule in rules {
        if input.tag_added(&rule.tag) {
            task.set_str(PRIORITY_ATTR, &rule.priority);
        } else if input.tag_removed(&rule.tag) {
            let other_present = rules
                .iter()
                .any(|r| r.tag != rule.tag && input.after.has_tag(&r.tag));
            if !other_present {
                task.remove(PRIORITY_ATTR);
            }
        }
    }
    HookOutcome::unchanged(task)
}

/// Strip work-in-progress tags when a task is completed.
pub fn completed_cleanup(input: &HookInput, config: &TaskwarriorConfig) -> HookOutcome {
    let mut outcome = HookOutcome::unchanged(input.after.clone());
    let completing =
        input.after.status() == Some("completed") && input.before.status() != Some("completed");
    if !completing {
        return outcome;
    }

    outcome.task.remove_tags(&config.completed_clear_tags);

    let had_any = config
        .completed_clear_tags
        .iter()
        .any(|t| input.before.has_tag(t));
    if had_any {
        let names: Vec<String> = config
            .completed_clear_tags
            .iter()
            .map(|t| format!("'{t}'"))
            .collect();
        outcome.feedback.push(format!(
            "Removed {} tags from completed task",
            names.join(" and ")
        ));
    }
    outcome
}

/// Start or stop a tmuxinator project along with a matching task.
pub fn tmuxinator(input: &HookInput, config: &TaskwarriorConfig) -> HookOutcome {
    let mut outcome = HookOutcome::unchanged(input.after.clone());
    let description = input.after.description().to_lowercase();

    let verb = if input.started() {
        "start"
    } else if input.stopped() {
        "stop"
    } else {
        return outcome;
    };

    for rule in &config.sessions {
        if description.contains(&rule.pattern.to_lowercase()) {
            outcome.actions.push(HookAction::Spawn(
                CommandSpec::new("tmuxinator").args([verb, rule.project.as_str()]),
            ));
        }
    }
    outcome
}

/// Open a URL or raise an app when a matching task starts. First matching rule wins.
pub fn launcher(input: &HookInput, config: &TaskwarriorConfig) -> HookOutcome {
    let mut outcome = HookOutcome::unchanged(input.after.clone());
    let description = input.after.description().to_lowercase();

    let Some(rule) = config
        .launchers
        .iter()
        .find(|r| description.contains(&r.pattern.to_lowercase()))
    else {
        return outcome;
    };
    if !input.started() {
        return outcome;
    }

    match &rule.action {
        LaunchAction::OpenUrl { url } => {
            outcome
                .actions
                .push(HookAction::Spawn(CommandSpec::new("xdg-open").arg(url)));
            outcome.actions.push(HookAction::Spawn(CommandSpec::new("xdotool").args([
                "search",
                "--sync",
                "--onlyvisible",
                "--class",
                config.browser_class.as_str(),
                "windowactivate",
            ])));
        }
        LaunchAction::FocusWindow { class_name } => {
            outcome.actions.push(HookAction::FocusWindow {
                class_name: class_name.clone(),
            });
        }
    }
    outcome
}

/// Run the hook chain, feeding each hook's task into the next.
pub fn all(input: &HookInput, config: &TaskwarriorConfig) -> HookOutcome {
    let chain: [fn(&HookInput, &TaskwarriorConfig) -> HookOutcome; 5] =
        [started_label, priority, completed_cleanup, tmuxinator, launcher];

    let mut current = input.clone();
    let mut feedback = Vec::new();
    let mut actions = Vec::new();
    for hook in chain {
        let outcome = hook(&current, config);
        feedback.extend(outcome.feedback);
        actions.extend(outcome.actions);
        current.after = outcome.task;
    }
    HookOutcome {
        task: current.after,
        feedback,
        actions,
    }
}
