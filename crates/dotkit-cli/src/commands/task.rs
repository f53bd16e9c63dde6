use std::io::Write;
use std::process::ExitCode;

use dotkit_config::DotkitConfig;
use dotkit_core::{Result, SystemRunner};
use dotkit_taskwarrior::report::{current_tasks_markdown, timew_summary};
use dotkit_taskwarrior::{HookInput, HookKind, execute_actions, render_automations, run_hook};

use super::{ReportAction, report_failure};

/// Taskwarrior aborts the modification on a nonzero exit, so bad input
/// is reported and exits 1 instead of echoing anything.
pub(super) async fn cmd_hook(config: &DotkitConfig, kind: HookKind) -> Result<ExitCode> {
    let input = match HookInput::read(std::io::stdin().lock()) {
        Ok(input) => input,
        Err(e) => return Ok(report_failure(&e)),
    };

    let outcome = run_hook(kind, &input, &config.taskwarrior);
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(outcome.render().as_bytes())?;
    stdout.flush()?;
    drop(stdout);

    execute_actions(&outcome.actions, &SystemRunner::new()).await;
    Ok(ExitCode::SUCCESS)
}

pub(super) fn cmd_automations(config: &DotkitConfig) -> Result<ExitCode> {
    print!("{}", render_automations(&config.taskwarrior));
    Ok(ExitCode::SUCCESS)
}

pub(super) async fn cmd_report(config: &DotkitConfig, action: ReportAction) -> Result<ExitCode> {
    let runner = SystemRunner::new();
    let markdown = match action {
        ReportAction::Timew { period } => timew_summary(&runner, &config.taskwarrior, period).await?,
        ReportAction::Tasks => current_tasks_markdown(&runner, &config.taskwarrior.project_names).await?,
    };
    print!("{markdown}");
    Ok(ExitCode::SUCCESS)
}
