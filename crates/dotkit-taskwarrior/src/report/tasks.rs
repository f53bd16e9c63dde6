use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use dotkit_core::{CommandRunner, CommandSpec, Result, run_checked};

/// Start of a task row: `ID AGE PROJECT ...`.
static ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s+\S+\s+(\S+)").expect("valid regex"));
static SUMMARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+ tasks?$").expect("valid regex"));

/// Turn the `task current` report into per-project Markdown checklists.
///
/// Rows are `ID AGE PROJECT TAGS DESCRIPTION... URGENCY`; a line that
/// doesn't start with an id continues the previous description. Project
/// codes are replaced by their configured names.
pub fn render_current_tasks(report: &str, names: &BTreeMap<String, String>) -> String {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();

    for line in report.lines().skip(2) {
        let line = line.trim();
        if line.is_empty() || SUMMARY.is_match(line) {
            continue;
        }
        if let Some(caps) = ROW.captures(line) {
            let project = caps[1].to_string();
            let words: Vec<&str> = line.split_whitespace().collect();
            let description = if words.len() > 5 {
                words[4..words.len() - 1].join(" ")
            } else {
                String::new()
            };
            match groups.iter_mut().find(|(p, _)| *p == project) {
                Some((_, tasks)) => tasks.push(description),
                None => groups.push((project, vec![description])),
            }
        } else if let Some(last) = groups.last_mut().and_then(|(_, t)| t.last_mut()) {
            last.push(' ');
            last.push_str(line);
        } else {
            debug!(line, "continuation before any task");
        }
    }

    let mut out = String::new();
    for (project, tasks) in groups {
        let name = names.get(&project).unwrap_or(&project);
        out.push_str(name);
        out.push('\n');
        for task in tasks {
            out.push_str(&format!("- [ ] {}\n", task.trim()));
        }
        out.push('\n');
    }
    out
}

/// Run `task current` and render it.
pub async fn current_tasks_markdown(
    runner: &dyn CommandRunner,
    names: &BTreeMap<String, String>,
) -> Result<String> {
    let report = run_checked(runner, &CommandSpec::new("task").arg("current")).await?;
    Ok(render_current_tasks(&report, names))
}
