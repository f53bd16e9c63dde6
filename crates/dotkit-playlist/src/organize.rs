//! LLM-assisted curation of the playlist.
//!
//! The current entries are handed to an external LLM CLI, which returns the
//! same list with `CATEGORY/SUB:` prefixes. A reply is only accepted when it
//! lists exactly the input tracks; anything else is retried with backoff.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use dotkit_config::schema::OrganizerConfig;
use dotkit_core::{CommandRunner, CommandSpec, DotkitError, Result, atomic_write, run_checked};

use crate::append::read_or_empty;
use crate::model::Playlist;

/// What an organize/sort/dedupe pass produced.
#[derive(Debug, Clone)]
pub struct OrganizeReport {
    pub entries: usize,
    /// Entries carrying a category after the pass.
    pub categorized: usize,
    /// Entries removed as duplicates.
    pub removed: usize,
    /// The new file contents.
    pub rendered: String,
    /// False for dry runs and for passes that changed nothing.
    pub written: bool,
    pub backup: Option<PathBuf>,
}

impl OrganizeReport {
    fn new(playlist: &Playlist) -> Self {
        Self {
            entries: playlist.len(),
            categorized: playlist.entries.iter().filter(|e| e.category().is_some()).count(),
            removed: 0,
            rendered: playlist.render(),
            written: false,
            backup: None,
        }
    }
}

/// The prompt sent to the LLM CLI on stdin.
pub fn build_prompt(playlist: &Playlist, categories: &[String]) -> String {
    let mut prompt = String::from(
        "You are organizing a music playlist. Assign every track a genre tag in the form \
         `CATEGORY/SUB: Title` (uppercase tag). Prefer these tags when they fit:\n",
    );
    for c in categories {
        prompt.push_str("- ");
        prompt.push_str(c);
        prompt.push('\n');
    }
    prompt.push_str(
        "\nRules:\n\
         - Keep every URL exactly as given. Do not add, drop or duplicate tracks.\n\
         - Keep an existing tag unless it is clearly wrong.\n\
         - Reply with the playlist only, in the same format: a `# <tag>: <title>` line \
         followed by the URL line. No commentary.\n\nPlaylist:\n",
    );
    let mut body = playlist.clone();
    body.header = false;
    prompt.push_str(&body.render());
    prompt
}

/// Strip Markdown code fences the model may wrap its reply in.
fn strip_fences(reply: &str) -> String {
    reply
        .lines()
        .filter(|l| !l.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a model reply and check it lists exactly the input tracks.
pub fn accept_reply(input: &Playlist, reply: &str) -> Result<Playlist> {
    let mut output = Playlist::parse(&strip_fences(reply));
    output.header = input.header;

    let mut counts: HashMap<String, i64> = HashMap::new();
    for u in input.normalized_urls() {
        *counts.entry(u).or_default() += 1;
    }
    for u in output.normalized_urls() {
        *counts.entry(u).or_default() -= 1;
    }
    let missing = counts.values().filter(|&&n| n > 0).count();
    let extra = counts.values().filter(|&&n| n < 0).count();

    if missing > 0 || extra > 0 {
        return Err(DotkitError::LlmResponse(format!(
            "reply has {} tracks for {} input tracks ({} missing, {} unexpected or duplicated)",
            output.len(),
            input.len(),
            missing,
            extra
        )));
    }
    Ok(output)
}

/// `base * 2^attempt`, saturating instead of overflowing.
fn backoff_ms(base: u64, attempt: u32) -> u64 {
    base.saturating_mul(2u64.saturating_pow(attempt))
}

/// Call the LLM CLI until it returns an acceptable reply.
async fn ask_with_retry(
    input: &Playlist,
    config: &OrganizerConfig,
    runner: &dyn CommandRunner,
) -> Result<Playlist> {
    let spec = CommandSpec::new(&config.command)
        .args(config.args.iter().cloned())
        .stdin(build_prompt(input, &config.categories))
        .timeout(Duration::from_secs(config.timeout_secs));

    let max = config.max_attempts.max(1);
    let mut last_err = None;

    for attempt in 0..max {
        let result = match run_checked(runner, &spec).await {
            Ok(reply) => accept_reply(input, &reply),
            Err(e) => Err(e),
        };
        match result {
            Ok(playlist) => return Ok(playlist),
            Err(e) if attempt + 1 < max => {
                let delay = backoff_ms(config.base_delay_ms, attempt);
                warn!(
                    command = %config.command,
                    attempt = attempt + 1,
                    max,
                    delay_ms = delay,
                    error = %e,
                    "retrying playlist organization"
                );
                tokio::time::sleep(Duration::from_millis(delay)).await;
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_err.unwrap_or_else(|| DotkitError::LlmResponse("no attempt made".into())))
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

/// Keep a `.bak` of the old contents, then replace the file.
fn write_with_backup(path: &Path, old: &str, report: &mut OrganizeReport) -> Result<()> {
    let backup = backup_path(path);
    atomic_write(&backup, old)?;
    atomic_write(path, &report.rendered)?;
    report.backup = Some(backup);
    report.written = true;
    Ok(())
}

/// Categorize the playlist with the LLM CLI, then sort and rewrite it.
pub async fn organize_with_llm(
    path: &Path,
    config: &OrganizerConfig,
    runner: &dyn CommandRunner,
    dry_run: bool,
) -> Result<OrganizeReport> {
    let old = read_or_empty(path)?;
    let input = Playlist::parse(&old);
    if input.is_empty() {
        info!(path = %path.display(), "playlist is empty, nothing to organize");
        return Ok(OrganizeReport::new(&input));
    }

    info!(entries = input.len(), command = %config.command, "organizing playlist");
    let mut organized = ask_with_retry(&input, config, runner).await?;
    organized.sort();

    let mut report = OrganizeReport::new(&organized);
    if dry_run {
        return Ok(report);
    }
    write_with_backup(path, &old, &mut report)?;
    info!(
        entries = report.entries,
        categorized = report.categorized,
        "playlist organized"
    );
    Ok(report)
}

/// Sort the playlist locally by category and title.
pub fn sort_playlist(path: &Path, dry_run: bool) -> Result<OrganizeReport> {
    let old = read_or_empty(path)?;
    let mut playlist = Playlist::parse(&old);
    playlist.sort();

    let mut report = OrganizeReport::new(&playlist);
    if dry_run || report.rendered == old {
        return Ok(report);
    }
    write_with_backup(path, &old, &mut report)?;
    Ok(report)
}

/// Remove later duplicates (by normalized URL).
pub fn dedupe_playlist(path: &Path, dry_run: bool) -> Result<OrganizeReport> {
    let old = read_or_empty(path)?;
    let mut playlist = Playlist::parse(&old);
    let removed = playlist.dedupe();

    let mut report = OrganizeReport::new(&playlist);
    report.removed = removed;
    if dry_run || removed == 0 {
        return Ok(report);
    }
    write_with_backup(path, &old, &mut report)?;
    info!(removed, path = %path.display(), "duplicates removed");
    Ok(report)
}
