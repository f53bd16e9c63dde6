use std::process::ExitCode;

use tracing::info;

use dotkit_config::DotkitConfig;
use dotkit_core::{Result, SystemRunner};
use dotkit_playlist::{OrganizeReport, native};

use super::PlaylistAction;

pub(super) async fn cmd_playlist(config: &DotkitConfig, action: PlaylistAction) -> Result<ExitCode> {
    let path = &config.playlist.path;
    match action {
        PlaylistAction::Add { url, title, dry_run } => {
            let shown = if title.trim().is_empty() { url.as_str() } else { title.trim() };
            if dotkit_playlist::append_to_playlist(&url, &title, path, dry_run)? {
                let verb = if dry_run { "Would add" } else { "Added" };
                println!("{verb}: {shown}");
            } else {
                println!("Already in playlist: {shown}");
            }
        }
        PlaylistAction::Organize { dry_run } => {
            let runner = SystemRunner::new();
            let report =
                dotkit_playlist::organize_with_llm(path, &config.playlist.organizer, &runner, dry_run).await?;
            print_report(&report, dry_run);
        }
        PlaylistAction::Sort { dry_run } => {
            print_report(&dotkit_playlist::sort_playlist(path, dry_run)?, dry_run);
        }
        PlaylistAction::Dedupe { dry_run } => {
            print_report(&dotkit_playlist::dedupe_playlist(path, dry_run)?, dry_run);
        }
        PlaylistAction::Normalize { urls } => {
            for url in &urls {
                println!("{}", dotkit_playlist::normalize_url(url));
            }
        }
        PlaylistAction::NativeHost => {
            let mut stdin = tokio::io::stdin();
            let mut stdout = tokio::io::stdout();
            native::serve_one(&mut stdin, &mut stdout, path).await?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_report(report: &OrganizeReport, dry_run: bool) {
    if dry_run {
        print!("{}", report.rendered);
        return;
    }
    info!(written = report.written, backup = ?report.backup, "playlist pass finished");
    println!(
        "{} entries, {} categorized, {} duplicates removed{}",
        report.entries,
        report.categorized,
        report.removed,
        if report.written { "" } else { " (unchanged)" }
    );
    if let Some(backup) = &report.backup {
        println!("Backup: {}", backup.display());
    }
}
