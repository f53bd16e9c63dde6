use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use dotkit_config::schema::TaskwarriorConfig;
use dotkit_core::{CommandRunner, CommandSpec, DotkitError, Result, run_checked};

use super::markdown_table;

const HIDDEN_LABEL: &str = "work";
const BREAK_LABEL: &str = "break";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    Day,
    Week,
    Month,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = DotkitError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            other => Err(DotkitError::InvalidInput(format!(
                "unknown period '{other}' (expected day, week or month)"
            ))),
        }
    }
}

/// One interval from `timew export`.
#[derive(Debug, Clone, Deserialize)]
pub struct TimewEntry {
    pub start: String,
    /// Missing while the interval is still open.
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Parse timew's `20241017T080000Z` timestamps (RFC 3339 also accepted).
fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y%m%dT%H%M%SZ") {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DotkitError::InvalidInput(format!("bad timestamp '{raw}': {e}")))
}

fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[derive(Default)]
struct TaskTotal {
    labels: BTreeSet<String>,
    secs: i64,
}

/// Aggregate closed intervals into a per-project Markdown table plus totals.
///
/// A tag naming a project counts toward it, a known tag is also a label,
/// and any other tag is part of the task name. The `work` label is not shown; `break` time is totalled
/// separately.
pub fn summarize(
    entries: &[TimewEntry],
    projects: &[String],
    known_labels: &[String],
    period: Period,
) -> Result<String> {
    // project -> [(task, totals)] in first-seen order
    let mut by_project: BTreeMap<String, Vec<(String, TaskTotal)>> = BTreeMap::new();
    let mut total = 0i64;
    let mut breaks = 0i64;

    for entry in entries {
        let Some(ref end) = entry.end else {
            debug!(start = %entry.start, "skipping open interval");
            continue;
        };
        let secs = (parse_time(end)? - parse_time(&entry.start)?).num_seconds();
        total += secs;

        let mut entry_projects: Vec<&str> = Vec::new();
        let mut labels = BTreeSet::new();
        let mut words: Vec<&str> = Vec::new();
        for tag in &entry.tags {
            let is_project = projects.contains(tag);
            let is_label = known_labels.contains(tag);
            if is_project {
                entry_projects.push(tag);
            }
            if is_label && tag != HIDDEN_LABEL {
                labels.insert(tag.clone());
            }
            if !is_project && !is_label {
                words.push(tag);
            }
        }
        if labels.contains(BREAK_LABEL) {
            breaks += secs;
        }

        entry_projects.sort_unstable();
        let project = if entry_projects.is_empty() {
            "Unassigned".to_string()
        } else {
            entry_projects.join(", ")
        };
        let task = if words.is_empty() {
            "-".to_string()
        } else {
            words.join(", ")
        };

        let tasks = by_project.entry(project).or_default();
        let idx = match tasks.iter().position(|(t, _)| *t == task) {
            Some(i) => i,
            None => {
                tasks.push((task, TaskTotal::default()));
                tasks.len() - 1
            }
        };
        let slot = &mut tasks[idx].1;
        slot.secs += secs;
        slot.labels.extend(labels);
    }

    let mut rows = Vec::new();
    for (project, tasks) in &by_project {
        let mut project_total = 0;
        for (task, t) in tasks {
            project_total += t.secs;
            let labels = if t.labels.is_empty() {
                "-".to_string()
            } else {
                t.labels.iter().cloned().collect::<Vec<_>>().join(", ")
            };
            rows.push(vec![
                project.clone(),
                labels,
                task.clone(),
                format_duration(t.secs),
            ]);
        }
        rows.push(vec![
            String::new(),
            String::new(),
            format!("Total for {project}: {}", format_duration(project_total)),
            String::new(),
        ]);
        rows.push(vec![String::new(); 4]);
    }

    let mut out = markdown_table(&["Project", "Labels", "Task", "Duration"], &rows);
    out.push_str(&format!(
        "\n**Overall total duration ({period}):** {}\n",
        format_duration(total)
    ));
    out.push_str(&format!(
        "**Overall total breaks duration ({period}):** {}\n",
        format_duration(breaks)
    ));
    out.push_str(&format!(
        "**Overall total duration without breaks ({period}):** {}\n",
        format_duration(total - breaks)
    ));
    Ok(out)
}

/// Run `task _projects` and `timew export :<period>` and summarize.
pub async fn timew_summary(
    runner: &dyn CommandRunner,
    config: &TaskwarriorConfig,
    period: Period,
) -> Result<String> {
    let projects = match run_checked(runner, &CommandSpec::new("task").arg("_projects")).await {
        Ok(out) => out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        Err(e @ DotkitError::CommandFailed { .. }) => {
            warn!(error = %e, "could not list projects, every entry is unassigned");
            Vec::new()
        }
        Err(e) => return Err(e),
    };

    let export = CommandSpec::new("timew").args(["export".to_string(), format!(":{period}")]);
    let entries: Vec<TimewEntry> = match run_checked(runner, &export).await {
        Ok(out) if out.trim().is_empty() => Vec::new(),
        Ok(out) => serde_json::from_str(&out)?,
        Err(e @ DotkitError::CommandFailed { .. }) => {
            warn!(error = %e, "timew export failed");
            Vec::new()
        }
        Err(e) => return Err(e),
    };

    summarize(&entries, &projects, &config.known_labels, period)
}
