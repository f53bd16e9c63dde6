use std::time::Duration;

use tracing::debug;

use dotkit_config::schema::DesktopConfig;
use dotkit_core::{CommandRunner, CommandSpec, DotkitError, Result, run_checked};

use crate::keys::{parse_key_sequence, xdotool_commands};

/// X11 clipboard, keyboard, window and dialog access through the usual
/// command-line tools.
pub struct Desktop<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a DesktopConfig,
}

impl<'a> Desktop<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a DesktopConfig) -> Self {
        Self { runner, config }
    }

    pub fn runner(&self) -> &'a dyn CommandRunner {
        self.runner
    }

    pub fn config(&self) -> &'a DesktopConfig {
        self.config
    }

    // ── Clipboard ──────────────────────────────────────────────

    async fn read_selection(&self, which: &str) -> Result<String> {
        let out = self
            .runner
            .run(&CommandSpec::new("xclip").args(["-selection", which, "-o"]))
            .await?;
        // xclip exits 1 when the selection is empty.
        Ok(if out.success() { out.stdout } else { String::new() })
    }

    async fn write_selection(&self, which: &str, text: &str) -> Result<()> {
        run_checked(
            self.runner,
            &CommandSpec::new("xclip").args(["-selection", which]).stdin(text),
        )
        .await
        .map(|_| ())
    }

    pub async fn clipboard(&self) -> Result<String> {
        self.read_selection("clipboard").await
    }

    /// The primary selection: whatever text is highlighted.
    pub async fn selection(&self) -> Result<String> {
        self.read_selection("primary").await
    }

    pub async fn set_clipboard(&self, text: &str) -> Result<()> {
        self.write_selection("clipboard", text).await
    }

    pub async fn set_selection(&self, text: &str) -> Result<()> {
        self.write_selection("primary", text).await
    }

    /// Empty both the clipboard and the primary selection.
    pub async fn clear_clipboards(&self) -> Result<()> {
        self.set_clipboard("").await?;
        self.set_selection("").await
    }

    // ── Keyboard and windows ───────────────────────────────────

    pub async fn send_keys(&self, sequence: &str) -> Result<()> {
        for cmd in xdotool_commands(&parse_key_sequence(sequence)?) {
            run_checked(self.runner, &cmd).await?;
        }
        Ok(())
    }

    /// Paste with Shift+Insert, which works in terminals too.
    pub async fn paste(&self) -> Result<()> {
        self.send_keys("<shift>+<insert>").await
    }

    pub async fn active_window_title(&self) -> Result<String> {
        let out = run_checked(
            self.runner,
            &CommandSpec::new("xdotool").args(["getactivewindow", "getwindowname"]),
        )
        .await?;
        Ok(out.trim().to_string())
    }

    pub fn is_browser(&self, window_title: &str) -> bool {
        self.config.browsers.iter().any(|b| window_title.contains(b.as_str()))
    }

    /// The active window title when it belongs to a browser.
    pub async fn browser_window(&self) -> Result<Option<String>> {
        let title = self.active_window_title().await?;
        if self.is_browser(&title) {
            Ok(Some(title))
        } else {
            debug!(window = %title, "not a browser window");
            Ok(None)
        }
    }

    pub async fn open_url(&self, url: &str) -> Result<()> {
        self.runner.spawn(&CommandSpec::new("xdg-open").arg(url)).await
    }

    /// Wait for the clipboard or a dialog to catch up with sent keys.
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(self.config.clipboard_settle_ms)).await;
    }

    // ── Dialogs ────────────────────────────────────────────────

    /// A self-closing info popup.
    pub async fn notify(&self, text: &str) -> Result<()> {
        let timeout = format!("--timeout={}", self.config.notify_timeout_secs);
        self.runner
            .spawn(&CommandSpec::new("zenity").args(["--info", timeout.as_str(), "--text", text]))
            .await
    }

    pub async fn error(&self, text: &str) -> Result<()> {
        self.runner
            .spawn(&CommandSpec::new("zenity").args(["--error", "--text", text]))
            .await
    }

    /// Run a zenity dialog and return what it printed. Exit code 1 means
    /// the user pressed Cancel.
    async fn dialog(&self, spec: CommandSpec) -> Result<String> {
        let out = self.runner.run(&spec).await?;
        match out.code {
            Some(0) => Ok(out.stdout.trim_end_matches('\n').to_string()),
            Some(1) => Err(DotkitError::Cancelled("dialog dismissed".into())),
            code => Err(DotkitError::CommandFailed {
                program: spec.program,
                code,
                stderr: out.stderr.trim().to_string(),
            }),
        }
    }

    pub async fn entry(&self, title: &str, text: &str, default: &str) -> Result<String> {
        self.dialog(CommandSpec::new("zenity").args([
            "--entry",
            "--title",
            title,
            "--text",
            text,
            "--entry-text",
            default,
            "--width",
            "400",
        ]))
        .await
    }

    /// A zenity form; `fields` are raw `--add-*` / `--combo-values=` args.
    /// Returns the values split on `|`.
    pub async fn form(&self, title: &str, text: &str, fields: &[String]) -> Result<Vec<String>> {
        let spec = CommandSpec::new("zenity")
            .arg("--forms")
            .arg(format!("--title={title}"))
            .arg(format!("--text={text}"))
            .arg("--separator=|")
            .args(fields.iter().cloned());
        let out = self.dialog(spec).await?;
        Ok(out.split('|').map(|s| s.trim().to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotkit_core::mock::MockRunner;

    #[tokio::test]
    async fn test_empty_clipboard_reads_as_empty() {
        let runner = MockRunner::new().with_failure(1, "Error: target STRING not available");
        let cfg = DesktopConfig::default();
        let desktop = Desktop::new(&runner, &cfg);
        assert_eq!(desktop.clipboard().await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_set_clipboard_pipes_stdin() {
        let runner = MockRunner::new();
        let cfg = DesktopConfig::default();
        Desktop::new(&runner, &cfg).set_clipboard("hello").await.unwrap();
        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls[0].argv(), vec!["xclip", "-selection", "clipboard"]);
        assert_eq!(calls[0].stdin.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_dialog_cancel() {
        let runner = MockRunner::new().with_failure(1, "");
        let cfg = DesktopConfig::default();
        let err = Desktop::new(&runner, &cfg)
            .entry("Task", "Description", "")
            .await
            .unwrap_err();
        assert!(matches!(err, DotkitError::Cancelled(_)));
    }

    #[test]
    fn test_is_browser() {
        let runner = MockRunner::new();
        let cfg = DesktopConfig::default();
        let desktop = Desktop::new(&runner, &cfg);
        assert!(desktop.is_browser("Rust - YouTube — Mozilla Firefox"));
        assert!(!desktop.is_browser("nvim ~/notes"));
    }
}
