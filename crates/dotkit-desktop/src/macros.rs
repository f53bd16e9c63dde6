//! Hotkey macros. Each one is a short script over [`Desktop`].

use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use tracing::{info, warn};

use dotkit_config::schema::PlaylistConfig;
use dotkit_core::{CommandSpec, DotkitError, Result, expand_home, run_checked};
use dotkit_playlist::{append_to_playlist, is_youtube_url, youtube_video_id};

use crate::desktop::Desktop;

// ── Templates ──────────────────────────────────────────────────

const ISSUE: &str = "
## Description



## Acceptance Criteria

- [ ]

## Related

";

const PR: &str = "## Summary
<!-- Brief summary of the purpose of this PR -->

## Key Changes
<!-- List the key changes introduced in this PR -->

## Dependencies
<!-- Mention any PRs or tasks that need to be completed first -->

## TODO
<!-- Checklist of tasks that need to be done before merging -->

- [ ] task 1

<!-- Mention Linear issue the PR closes or fixes -->
Closes DOC-
";

const IT: &str = "## Description

## Acceptance Criteria

- [ ]


## Related

- patent issues, related and blockers
";

const TRIGGER_REVIEW: &str = "## Summary
<!-- Brief summary of the purpose of this PR -->
Workflows triggers cleanup

<!-- Mention Linear issue the PR closes or fixes -->
References OPS-
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Issue,
    Pr,
    /// Issue template with the cursor left under `## Description`.
    It,
    TriggerReview,
    Email,
}

impl Template {
    pub const ALL: [Template; 5] = [
        Template::Issue,
        Template::Pr,
        Template::It,
        Template::TriggerReview,
        Template::Email,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Template::Issue => "issue",
            Template::Pr => "pr",
            Template::It => "it",
            Template::TriggerReview => "trigger-review",
            Template::Email => "email",
        }
    }
}

impl FromStr for Template {
    type Err = DotkitError;

    fn from_str(s: &str) -> Result<Self> {
        Template::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DotkitError::InvalidInput(format!("unknown template '{s}'")))
    }
}

pub async fn paste_template(desktop: &Desktop<'_>, template: Template) -> Result<()> {
    let text = match template {
        Template::Issue => ISSUE,
        Template::Pr => PR,
        Template::It => IT,
        Template::TriggerReview => TRIGGER_REVIEW,
        Template::Email => {
            let email = desktop.config().email.as_str();
            if email.is_empty() {
                return Err(DotkitError::Config("desktop.email is not set".into()));
            }
            email
        }
    };
    desktop.set_clipboard(text).await?;
    desktop.paste().await?;
    if template == Template::It {
        desktop.send_keys("<up><up><up><up><enter>").await?;
    }
    Ok(())
}

// ── Text snippets ──────────────────────────────────────────────

pub async fn insert_date(desktop: &Desktop<'_>, today: NaiveDate) -> Result<()> {
    desktop.send_keys(&today.format("%Y-%m-%d").to_string()).await
}

const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub fn random_string(length: usize) -> String {
    (0..length)
        .map(|_| ALPHANUMERIC[rand::random::<u32>() as usize % ALPHANUMERIC.len()] as char)
        .collect()
}

pub async fn type_random_string(desktop: &Desktop<'_>, length: usize) -> Result<()> {
    desktop.send_keys(&random_string(length)).await
}

fn markdown_link(text: &str, url: &str) -> String {
    format!("[{}]({})", text.trim(), url.trim())
}

/// `[selection](clipboard)` into the clipboard, then paste.
pub async fn paste_markdown_link(desktop: &Desktop<'_>) -> Result<()> {
    let description = desktop.selection().await?;
    let url = desktop.clipboard().await?;
    desktop.set_clipboard(&markdown_link(&description, &url)).await?;
    desktop.paste().await
}

// ── Browser macros ─────────────────────────────────────────────

/// Have the browser copy the page URL with its copy keys.
async fn capture_url(desktop: &Desktop<'_>) -> Result<String> {
    desktop.set_clipboard("").await?;
    desktop.send_keys(&desktop.config().copy_url_keys).await?;
    desktop.settle().await;
    Ok(desktop.clipboard().await?.trim().to_string())
}

/// In a browser, put `[selection](page url)` into the clipboard.
/// Returns the link, or `None` outside a browser.
pub async fn copy_url_markdown(desktop: &Desktop<'_>) -> Result<Option<String>> {
    if desktop.browser_window().await?.is_none() {
        return Ok(None);
    }
    let url = capture_url(desktop).await?;
    let description = desktop.selection().await?;
    let link = markdown_link(&description, &url);
    desktop.set_clipboard(&link).await?;
    Ok(Some(link))
}

pub fn youtube_embed(url: &str) -> String {
    match youtube_video_id(url) {
        Some(id) => format!(
            "[![Video Thumbnail](https://img.youtube.com/vi/{id}/0.jpg)](https://www.youtube.com/watch?v={id})"
        ),
        None => format!("[{url}]({url})"),
    }
}

/// In a browser, put a thumbnail link for the current video into the
/// clipboard; other pages get a plain link.
pub async fn embed_youtube(desktop: &Desktop<'_>) -> Result<Option<String>> {
    if desktop.browser_window().await?.is_none() {
        return Ok(None);
    }
    let url = capture_url(desktop).await?;
    let markdown = youtube_embed(&url);
    desktop.set_clipboard(&markdown).await?;
    Ok(Some(markdown))
}

pub fn search_url(base: &str, phrase: &str) -> Option<String> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }
    Some(format!("{}{}", base, words.join("+")))
}

pub async fn search_selection(desktop: &Desktop<'_>) -> Result<()> {
    let phrase = desktop.selection().await?;
    match search_url(&desktop.config().search_url, &phrase) {
        Some(url) => desktop.open_url(&url).await,
        None => {
            info!("nothing selected to search for");
            Ok(())
        }
    }
}

/// In Google Docs with a URL in the clipboard, insert it as a link over
/// the selected text; anywhere else, plain paste.
pub async fn paste_link(desktop: &Desktop<'_>) -> Result<()> {
    let title = desktop.active_window_title().await?;
    let clip = desktop.clipboard().await?;
    let is_url = clip.starts_with("http://") || clip.starts_with("https://");

    if title.contains("Google Docs") && desktop.is_browser(&title) && is_url {
        desktop.send_keys("<ctrl>+k").await?;
        desktop.settle().await;
        desktop.paste().await?;
        desktop.settle().await;
        desktop.send_keys("<enter>").await
    } else {
        desktop.paste().await
    }
}

// ── Taskwarrior ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub description: String,
    pub category: String,
    pub project: String,
}

impl NewTask {
    pub fn add_command(&self) -> CommandSpec {
        let mut spec = CommandSpec::new("task")
            .arg("add")
            .arg(&self.description)
            .arg(format!("+{}", self.category.to_lowercase()));
        if !self.project.is_empty() {
            spec = spec.arg(format!("project:{}", self.project));
        }
        spec
    }
}

async fn ask_for_task(desktop: &Desktop<'_>) -> Result<NewTask> {
    let projects = run_checked(desktop.runner(), &CommandSpec::new("task").arg("_projects")).await?;
    let projects: Vec<&str> = projects.lines().map(str::trim).filter(|p| !p.is_empty()).collect();
    if projects.is_empty() {
        return Err(DotkitError::NotFound("no Taskwarrior projects".into()));
    }

    let fields = [
        "--add-entry=Description".to_string(),
        "--add-combo=Category".to_string(),
        "--combo-values=Work|Home".to_string(),
        "--add-combo=Project".to_string(),
        format!("--combo-values={}", projects.join("|")),
    ];
    let values = desktop.form("New Task", "Enter task details:", &fields).await?;
    let [description, category, project] = values.as_slice() else {
        return Err(DotkitError::InvalidInput("incomplete task form".into()));
    };
    if description.is_empty() {
        return Err(DotkitError::InvalidInput("task description is empty".into()));
    }
    Ok(NewTask {
        description: description.clone(),
        category: if category.is_empty() { "Work".into() } else { category.clone() },
        project: project.clone(),
    })
}

/// Ask for a task in a form and add it. Failures are shown in a dialog as
/// well as returned.
pub async fn create_task(desktop: &Desktop<'_>) -> Result<Option<NewTask>> {
    let result = async {
        let task = ask_for_task(desktop).await?;
        run_checked(desktop.runner(), &task.add_command()).await?;
        Ok::<_, DotkitError>(task)
    }
    .await;

    match result {
        Ok(task) => {
            info!(description = %task.description, "task created");
            Ok(Some(task))
        }
        Err(DotkitError::Cancelled(_)) => Ok(None),
        Err(e) => {
            if let Err(shown) = desktop.error(&format!("Error creating task:\n{e}")).await {
                warn!(error = %shown, "cannot show error dialog");
            }
            Err(e)
        }
    }
}

// ── Media ──────────────────────────────────────────────────────

/// Strip the browser and site suffixes from a window title:
/// `Song - YouTube — Mozilla Firefox` → `Song`.
pub fn page_title(window_title: &str, browsers: &[String]) -> String {
    let mut title = window_title.trim();
    for sep in [" — ", " - "] {
        if let Some((head, tail)) = title.rsplit_once(sep) {
            if browsers.iter().any(|b| tail.contains(b.as_str())) || tail.contains("Mozilla") {
                title = head.trim();
            }
        }
    }
    if let Some(head) = title.strip_suffix(" - YouTube") {
        title = head.trim();
    }
    title.to_string()
}

/// In a browser, add the YouTube URL in the clipboard to the playlist
/// under the page title. Returns whether an entry was added.
pub async fn playlist_add(desktop: &Desktop<'_>, playlist: &PlaylistConfig) -> Result<bool> {
    let Some(window) = desktop.browser_window().await? else {
        return Ok(false);
    };
    let url = desktop.clipboard().await?.trim().to_string();
    let result = if is_youtube_url(&url) {
        let title = page_title(&window, &desktop.config().browsers);
        let added = append_to_playlist(&url, &title, &expand_home(&playlist.path), false)?;
        desktop
            .notify(&if added { format!("Added: {title}") } else { format!("Already in playlist: {title}") })
            .await?;
        Ok(added)
    } else {
        desktop.notify("The URL must be from YouTube").await?;
        Err(DotkitError::Playlist(format!("not a YouTube URL: '{url}'")))
    };
    desktop.clear_clipboards().await?;
    result
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MusicDownload {
    NotYoutube,
    AlreadyExists(String),
    Started(String),
}

/// In a browser, download the clipboard's YouTube URL as MP3 into the
/// music directory unless a file with that title is already there.
pub async fn download_music(desktop: &Desktop<'_>, playlist: &PlaylistConfig) -> Result<Option<MusicDownload>> {
    if desktop.browser_window().await?.is_none() {
        return Ok(None);
    }
    let url = desktop.clipboard().await?.trim().to_string();
    let outcome = if url.contains("youtu") {
        start_download(desktop, &url, &expand_home(&playlist.music_dir), playlist).await?
    } else {
        desktop.notify("No YouTube URL in clipboard").await?;
        MusicDownload::NotYoutube
    };
    desktop.clear_clipboards().await?;
    Ok(Some(outcome))
}

async fn start_download(
    desktop: &Desktop<'_>,
    url: &str,
    music_dir: &Path,
    playlist: &PlaylistConfig,
) -> Result<MusicDownload> {
    let title = run_checked(
        desktop.runner(),
        &CommandSpec::new("yt-dlp").args([
            "--get-filename",
            "-o",
            "%(title)s",
            "--restrict-filenames",
            "--no-playlist",
            url,
        ]),
    )
    .await?
    .trim()
    .to_string();

    if music_dir.join(format!("{title}.mp3")).exists() {
        desktop.notify(&format!("Already exists: {title}")).await?;
        return Ok(MusicDownload::AlreadyExists(title));
    }

    let download = match &playlist.download_script {
        Some(script) => CommandSpec::new(expand_home(script).to_string_lossy()).args(["-mp3", url]),
        None => {
            let output = format!("{}/%(title)s.%(ext)s", music_dir.display());
            CommandSpec::new("yt-dlp").args([
                "-x",
                "--audio-format",
                "mp3",
                "--restrict-filenames",
                "--no-playlist",
                "-o",
                output.as_str(),
                url,
            ])
        }
    };
    desktop.runner().spawn(&download).await?;
    desktop.notify(&format!("Downloading: {title}")).await?;
    Ok(MusicDownload::Started(title))
}

// ── Conky ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConkyState {
    Started,
    Stopped,
}

pub async fn toggle_conky(desktop: &Desktop<'_>) -> Result<ConkyState> {
    let running = desktop.runner().run(&CommandSpec::new("pgrep").arg("conky")).await?.success();
    if running {
        desktop.runner().run(&CommandSpec::new("killall").arg("conky")).await?;
        Ok(ConkyState::Stopped)
    } else {
        let config = expand_home(&desktop.config().conky_config);
        desktop
            .runner()
            .spawn(&CommandSpec::new("conky").arg("-c").arg(config.to_string_lossy()))
            .await?;
        Ok(ConkyState::Started)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_string() {
        let s = random_string(6);
        assert_eq!(s.len(), 6);
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(random_string(0), "");
    }

    #[test]
    fn test_template_names() {
        assert_eq!("trigger-review".parse::<Template>().unwrap(), Template::TriggerReview);
        assert!("memo".parse::<Template>().is_err());
    }

    #[test]
    fn test_search_url() {
        let base = "https://duckduckgo.com/?q=";
        assert_eq!(
            search_url(base, "  rust  async traits\n").as_deref(),
            Some("https://duckduckgo.com/?q=rust+async+traits")
        );
        assert_eq!(search_url(base, "   "), None);
    }

    #[test]
    fn test_youtube_embed() {
        assert_eq!(
            youtube_embed("https://youtu.be/dQw4w9WgXcQ"),
            "[![Video Thumbnail](https://img.youtube.com/vi/dQw4w9WgXcQ/0.jpg)](https://www.youtube.com/watch?v=dQw4w9WgXcQ)"
        );
        assert_eq!(youtube_embed("https://example.com"), "[https://example.com](https://example.com)");
    }

    #[test]
    fn test_page_title() {
        let browsers = vec!["Firefox".to_string()];
        assert_eq!(page_title("Lo-fi beats - YouTube — Mozilla Firefox", &browsers), "Lo-fi beats");
        assert_eq!(page_title("Some page", &browsers), "Some page");
    }

    #[test]
    fn test_add_command() {
        let task = NewTask {
            description: "Review deploy".into(),
            category: "Work".into(),
            project: "ops".into(),
        };
        assert_eq!(
            task.add_command().argv(),
            vec!["task", "add", "Review deploy", "+work", "project:ops"]
        );
    }
}
