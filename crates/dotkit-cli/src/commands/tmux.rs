use std::process::ExitCode;

use dotkit_config::DotkitConfig;
use dotkit_core::{DotkitError, Result, SystemRunner};
use dotkit_tmux::{BroadcastMode, PaneAddress};

use super::{joined, report_failure};

pub(super) async fn cmd_snd(config: &DotkitConfig, agents: bool, message: Vec<String>) -> Result<ExitCode> {
    let runner = SystemRunner::new();
    let mode = if agents { BroadcastMode::Agents } else { BroadcastMode::Monitored };
    let message = joined(&message);

    let report = match dotkit_tmux::broadcast(&runner, mode, Some(&message), &config.tmux).await {
        Ok(report) => report,
        Err(e @ DotkitError::NotFound(_)) => return Ok(report_failure(&e)),
        Err(e) => return Err(e),
    };
    for target in &report.delivered {
        println!("Sent to {target}");
    }
    for target in &report.failed {
        eprintln!("Failed: {target}");
    }
    Ok(if report.failed.is_empty() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

pub(super) async fn cmd_send_keys(
    config: &DotkitConfig,
    list: bool,
    session: Option<String>,
    exclude: Option<PaneAddress>,
    keys: Vec<String>,
) -> Result<ExitCode> {
    let runner = SystemRunner::new();
    let cfg = &config.tmux;
    let sessions = dotkit_tmux::load_sessions(&cfg.registry_dir, &cfg.registry_prefix)?;
    if sessions.is_empty() {
        println!("No registered Claude sessions found");
        return Ok(ExitCode::SUCCESS);
    }

    let inside_tmux = std::env::var_os("TMUX").is_some_and(|v| !v.is_empty());
    let current = dotkit_tmux::current_pane(&runner, inside_tmux).await;
    let targets = match dotkit_tmux::select_targets(sessions, current.as_ref(), exclude.as_ref(), session.as_deref()) {
        Ok(targets) => targets,
        Err(e @ DotkitError::NotFound(_)) => return Ok(report_failure(&e)),
        Err(e) => return Err(e),
    };

    let keys = joined(&keys);
    if list || keys.is_empty() {
        println!("Registered sessions:");
        for (i, s) in targets.iter().enumerate() {
            println!("{}", s.list_line(i + 1));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let summary = dotkit_tmux::send_to_sessions(&runner, &targets, &keys, cfg.max_parallel).await;
    for (addr, error) in &summary.failed {
        eprintln!("Failed to send to {addr}: {error}");
    }
    println!("{}", summary.summary_line());
    Ok(ExitCode::SUCCESS)
}
