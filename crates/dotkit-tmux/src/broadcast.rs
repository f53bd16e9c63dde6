use tracing::{debug, info, warn};

use dotkit_config::schema::TmuxConfig;
use dotkit_core::{CommandRunner, CommandSpec, DotkitError, Result};

use crate::pane::{list_panes, send_keys};

const AGENT_FORMAT: &str = "#{session_name}:#{window_index}.#{pane_index} #{?#{@agent_name},#{@agent_name},}";
const PID_FORMAT: &str = "#{session_name}:#{window_index}.#{pane_index} #{pane_pid}";

/// How broadcast targets are discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BroadcastMode {
    /// Panes running the monitor wrapper script.
    #[default]
    Monitored,
    /// Panes with a non-empty `@agent_name` option.
    Agents,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: Vec<String>,
    pub failed: Vec<String>,
}

/// Panes whose `@agent_name` is set.
pub async fn agent_panes(runner: &dyn CommandRunner) -> Result<Vec<String>> {
    Ok(list_panes(runner, AGENT_FORMAT)
        .await?
        .into_iter()
        .filter(|(_, agent)| !agent.is_empty())
        .map(|(target, _)| target)
        .collect())
}

/// Panes whose process tree mentions `monitor_process`.
pub async fn monitored_panes(runner: &dyn CommandRunner, monitor_process: &str) -> Result<Vec<String>> {
    let mut targets = Vec::new();
    for (target, pid) in list_panes(runner, PID_FORMAT).await? {
        if pid.is_empty() {
            continue;
        }
        let ps = CommandSpec::new("ps").args(["--ppid", pid.as_str(), "-p", pid.as_str(), "-o", "args="]);
        // `ps` exits nonzero when nothing matches; only the text matters.
        match runner.run(&ps).await {
            Ok(out) if out.stdout.contains(monitor_process) => targets.push(target),
            Ok(_) => {}
            Err(e) => debug!(pane = %target, error = %e, "ps failed"),
        }
    }
    Ok(targets)
}

/// Send `message` to every discovered pane and press Enter.
///
/// Fails with [`DotkitError::NotFound`] when no pane qualifies.
pub async fn broadcast(
    runner: &dyn CommandRunner,
    mode: BroadcastMode,
    message: Option<&str>,
    config: &TmuxConfig,
) -> Result<BroadcastReport> {
    let targets = match mode {
        BroadcastMode::Agents => agent_panes(runner).await?,
        BroadcastMode::Monitored => monitored_panes(runner, &config.monitor_process).await?,
    };
    if targets.is_empty() {
        return Err(DotkitError::NotFound(match mode {
            BroadcastMode::Agents => "no tmux panes with an agent name".into(),
            BroadcastMode::Monitored => format!("no tmux panes running {}", config.monitor_process),
        }));
    }

    let message = message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(&config.default_message);

    let mut report = BroadcastReport::default();
    for target in targets {
        match send_keys(runner, &target, message, true).await {
            Ok(()) => report.delivered.push(target),
            Err(e) => {
                warn!(pane = %target, error = %e, "broadcast failed");
                report.failed.push(target);
            }
        }
    }
    info!(delivered = report.delivered.len(), failed = report.failed.len(), "broadcast done");
    Ok(report)
}
