use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration, maps to `dotkit.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DotkitConfig {
    pub logging: LoggingConfig,
    pub playlist: PlaylistConfig,
    pub status: StatusConfig,
    pub weather: WeatherConfig,
    pub notifications: NotificationsConfig,
    pub taskwarrior: TaskwarriorConfig,
    pub tmux: TmuxConfig,
    pub desktop: DesktopConfig,
    pub services: ServicesConfig,
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty", "json", "compact".
    pub format: String,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: "compact".into(),
            file: None,
        }
    }
}

// ── Playlist ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistConfig {
    /// The curated `# title` / `url` playlist.
    pub path: PathBuf,
    /// Playlist of downloaded video files.
    pub video_playlist: PathBuf,
    pub videos_dir: PathBuf,
    pub music_dir: PathBuf,
    /// Downloader invoked as `<script> [-mp3] <url>`.
    pub download_script: Option<PathBuf>,
    pub organizer: OrganizerConfig,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("~/haruna_playlist.m3u"),
            video_playlist: PathBuf::from("~/vids_playlist.m3u"),
            videos_dir: PathBuf::from("~/Videos"),
            music_dir: PathBuf::from("~/music"),
            download_script: None,
            organizer: OrganizerConfig::default(),
        }
    }
}

/// External LLM CLI used to categorize playlist entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizerConfig {
    /// Program to invoke; the prompt is written to its stdin.
    pub command: String,
    pub args: Vec<String>,
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Backoff base; attempt `n` waits `base_delay_ms * 2^n`.
    pub base_delay_ms: u64,
    pub timeout_secs: u64,
    /// Suggested category vocabulary handed to the model.
    pub categories: Vec<String>,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            command: "claude".into(),
            args: vec!["-p".into()],
            max_attempts: 3,
            base_delay_ms: 2000,
            timeout_secs: 120,
            categories: vec![
                "AMBIENT/CALM".into(),
                "FOCUS/CODING".into(),
                "ELECTRONIC/CHILL".into(),
                "ELECTRONIC/UPBEAT".into(),
                "ROCK/METAL".into(),
                "CLASSICAL/ORCHESTRAL".into(),
                "JAZZ/LOUNGE".into(),
                "SOUNDTRACK/GAME".into(),
            ],
        }
    }
}

// ── Service status ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    pub services: Vec<ServiceEntry>,
    /// Consecutive non-operational polls before an incident is reported.
    pub debounce_cycles: u32,
    pub state_file: PathBuf,
    pub timeout_secs: u64,
    pub user_agent: String,
}

/// How a status endpoint is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// statuspage.io `/api/v2/status.json`.
    Statuspage,
    Aws,
    Gcp,
    /// HTML status page scanned for keywords.
    Azure,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub name: String,
    pub kind: ServiceKind,
    pub api: String,
    /// Human-facing page linked from the menu.
    pub page: String,
}

impl ServiceEntry {
    fn new(name: &str, kind: ServiceKind, api: &str, page: &str) -> Self {
        Self {
            name: name.into(),
            kind,
            api: api.into(),
            page: page.into(),
        }
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        use ServiceKind::*;
        Self {
            services: vec![
                ServiceEntry::new(
                    "AWS",
                    Aws,
                    "https://status.aws.amazon.com/data.json",
                    "https://status.aws.amazon.com/",
                ),
                ServiceEntry::new(
                    "GCP",
                    Gcp,
                    "https://status.cloud.google.com/incidents.json",
                    "https://status.cloud.google.com/",
                ),
                ServiceEntry::new(
                    "Azure",
                    Azure,
                    "https://status.azure.com/en-us/status",
                    "https://status.azure.com/en-us/status",
                ),
                ServiceEntry::new(
                    "Netlify",
                    Statuspage,
                    "https://www.netlifystatus.com/api/v2/status.json",
                    "https://www.netlifystatus.com/",
                ),
                ServiceEntry::new(
                    "GitHub",
                    Statuspage,
                    "https://www.githubstatus.com/api/v2/status.json",
                    "https://www.githubstatus.com/",
                ),
                ServiceEntry::new(
                    "Linear",
                    Statuspage,
                    "https://linearstatus.com/api/v2/status.json",
                    "https://linearstatus.com/",
                ),
                ServiceEntry::new(
                    "GoDaddy",
                    Statuspage,
                    "https://status.godaddy.com/api/v2/status.json",
                    "https://status.godaddy.com/",
                ),
                ServiceEntry::new(
                    "Claude",
                    Statuspage,
                    "https://status.anthropic.com/api/v2/status.json",
                    "https://status.anthropic.com/",
                ),
                ServiceEntry::new(
                    "Quay",
                    Statuspage,
                    "https://status.redhat.com/api/v2/status.json",
                    "https://status.redhat.com/",
                ),
            ],
            debounce_cycles: 2,
            state_file: PathBuf::from("~/.cache/dotkit/status-state.json"),
            timeout_secs: 5,
            user_agent: "Mozilla/5.0".into(),
        }
    }
}

// ── Weather ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Metric,
    Imperial,
    /// Kelvin.
    Standard,
}

impl Units {
    pub fn as_query(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Standard => "K",
        }
    }

    pub fn speed_suffix(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            _ => "m/s",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub location: String,
    pub units: Units,
    pub lang: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            location: "Mittelbuchen".into(),
            units: Units::Metric,
            lang: "en".into(),
            base_url: "https://api.openweathermap.org/data/2.5".into(),
            timeout_secs: 5,
        }
    }
}

// ── Claude notifications ───────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// Directory holding `claude-notification-*` marker files.
    pub dir: PathBuf,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/run/user/1000".into());
        Self {
            dir: PathBuf::from(runtime).join("claude-monitor"),
        }
    }
}

// ── Taskwarrior ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskwarriorConfig {
    /// Tag → `manual_priority` value applied when the tag is added.
    pub priority_tags: Vec<PriorityTag>,
    /// Tag added when a task is started.
    pub started_tag: String,
    /// Tags removed when a task is completed.
    pub completed_clear_tags: Vec<String>,
    /// Actions run when a task whose description matches is started.
    pub launchers: Vec<LauncherRule>,
    /// tmuxinator projects tied to a task's start/stop.
    pub sessions: Vec<SessionRule>,
    /// Browser window class focused after opening a URL.
    pub browser_class: String,
    /// Labels recognized by the time report (everything else is a task word).
    pub known_labels: Vec<String>,
    /// Project code → human readable name for the task report.
    pub project_names: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityTag {
    pub tag: String,
    pub priority: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LauncherRule {
    /// Case-insensitive substring of the task description.
    #[serde(rename = "match")]
    pub pattern: String,
    #[serde(flatten)]
    pub action: LaunchAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LaunchAction {
    OpenUrl { url: String },
    FocusWindow { class_name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRule {
    #[serde(rename = "match")]
    pub pattern: String,
    pub project: String,
}

impl Default for TaskwarriorConfig {
    fn default() -> Self {
        Self {
            priority_tags: vec![
                PriorityTag {
                    tag: "review".into(),
                    priority: "-1.000000".into(),
                },
                PriorityTag {
                    tag: "next".into(),
                    priority: "1.000000".into(),
                },
            ],
            started_tag: "started".into(),
            completed_clear_tags: vec!["started".into(), "review".into()],
            launchers: vec![
                LauncherRule {
                    pattern: "check github notifications".into(),
                    action: LaunchAction::OpenUrl {
                        url: "https://github.com/notifications".into(),
                    },
                },
                LauncherRule {
                    pattern: "respond to slack messages".into(),
                    action: LaunchAction::FocusWindow {
                        class_name: "Slack".into(),
                    },
                },
            ],
            sessions: vec![SessionRule {
                pattern: "fill standup forms".into(),
                project: "standup".into(),
            }],
            browser_class: "Firefox".into(),
            known_labels: [
                "work",
                "break",
                "meeting",
                "linear",
                "next",
                "call",
                "subtask",
                "automation",
                "install",
                "review",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            project_names: BTreeMap::from([(String::new(), "None".to_string())]),
        }
    }
}

// ── tmux ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TmuxConfig {
    /// Message broadcast when none is given.
    pub default_message: String,
    /// Process name identifying a monitored Claude pane.
    pub monitor_process: String,
    /// Directory scanned for session registration files.
    pub registry_dir: PathBuf,
    pub registry_prefix: String,
    /// Upper bound on concurrent `send-keys` calls.
    pub max_parallel: usize,
}

impl Default for TmuxConfig {
    fn default() -> Self {
        Self {
            default_message: "read my broadcast and keep collaborating".into(),
            monitor_process: "__claude_with_monitor.sh".into(),
            registry_dir: PathBuf::from("/tmp"),
            registry_prefix: "claude_broadcast_".into(),
            max_parallel: 10,
        }
    }
}

// ── Desktop ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    /// Window title fragments that identify a browser.
    pub browsers: Vec<String>,
    /// Keys that make the browser copy the current URL (vimium `yy`).
    pub copy_url_keys: String,
    /// Wait after sending keys before reading the clipboard.
    pub clipboard_settle_ms: u64,
    pub search_url: String,
    /// Seconds a zenity notification stays up.
    pub notify_timeout_secs: u64,
    pub email: String,
    pub conky_config: PathBuf,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            browsers: vec![
                "Firefox".into(),
                "Chrome".into(),
                "Brave".into(),
                "LibreWolf".into(),
            ],
            copy_url_keys: "yy".into(),
            clipboard_settle_ms: 500,
            search_url: "https://duckduckgo.com/?q=".into(),
            notify_timeout_secs: 3,
            email: String::new(),
            conky_config: PathBuf::from("~/.config/conky/Mirach/Mirach.conf"),
        }
    }
}

// ── Services ───────────────────────────────────────────────────

/// External service API keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// OpenWeatherMap key. Falls back to WEATHER_API_KEY, then `~/.envrc`.
    pub weather_api_key: Option<String>,
    /// YouTube Data API key (YOUTUBE_API_KEY).
    pub youtube_api_key: Option<String>,
    /// Channel listed by `youtube-catalog` (YOUTUBE_CHANNEL_ID).
    pub youtube_channel_id: Option<String>,
    /// Perplexity key (PPLX_API_KEY).
    pub perplexity_api_key: Option<String>,
}

// ── Validation ─────────────────────────────────────────────────

/// A single config validation issue.
#[derive(Debug)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let icon = match self.severity {
            WarningSeverity::Error => "❌",
            WarningSeverity::Warning => "⚠️ ",
            WarningSeverity::Info => "💡",
        };
        write!(f, "{} {}: {}", icon, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, "\n   ↳ {}", h)?;
        }
        Ok(())
    }
}

impl DotkitConfig {
    /// Validate the config and return a list of warnings/errors.
    /// Returns `Err` with all messages joined if any severity is Error.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, String> {
        let mut warnings = Vec::new();

        // ── Organizer ───
        let org = &self.playlist.organizer;
        if org.command.trim().is_empty() {
            warnings.push(ConfigWarning {
                field: "playlist.organizer.command".into(),
                message: "command is empty".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to the LLM CLI to call, e.g. 'claude'".into()),
            });
        }
        if org.max_attempts == 0 {
            warnings.push(ConfigWarning {
                field: "playlist.organizer.max_attempts".into(),
                message: "max_attempts is 0, the organizer would never run".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 3".into()),
            });
        }
        if org.timeout_secs == 0 {
            warnings.push(ConfigWarning {
                field: "playlist.organizer.timeout_secs".into(),
                message: "timeout is 0, every call would time out".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 120".into()),
            });
        }

        // ── Status ───
        if self.status.debounce_cycles == 0 {
            warnings.push(ConfigWarning {
                field: "status.debounce_cycles".into(),
                message: "debounce_cycles is 0".into(),
                severity: WarningSeverity::Warning,
                hint: Some("Use 1 to disable debouncing; 0 behaves the same".into()),
            });
        }
        let mut seen = std::collections::HashSet::new();
        for svc in &self.status.services {
            if !seen.insert(svc.name.as_str()) {
                warnings.push(ConfigWarning {
                    field: format!("status.services.{}", svc.name),
                    message: "duplicate service name".into(),
                    severity: WarningSeverity::Error,
                    hint: Some("Service names key the debounce state and must be unique".into()),
                });
            }
            if !svc.api.starts_with("http://") && !svc.api.starts_with("https://") {
                warnings.push(ConfigWarning {
                    field: format!("status.services.{}.api", svc.name),
                    message: format!("'{}' is not an http(s) URL", svc.api),
                    severity: WarningSeverity::Error,
                    hint: None,
                });
            }
        }

        // ── Weather ───
        if self.services.weather_api_key.is_none() {
            warnings.push(ConfigWarning {
                field: "services.weather_api_key".into(),
                message: "no OpenWeatherMap key, the weather widget will show a fallback".into(),
                severity: WarningSeverity::Info,
                hint: Some("Set WEATHER_API_KEY or services.weather_api_key".into()),
            });
        }
        if self.weather.location.trim().is_empty() {
            warnings.push(ConfigWarning {
                field: "weather.location".into(),
                message: "location is empty".into(),
                severity: WarningSeverity::Warning,
                hint: Some("Set to a city name, e.g. 'Berlin'".into()),
            });
        }

        // ── Taskwarrior ───
        for rule in &self.taskwarrior.launchers {
            if rule.pattern.trim().is_empty() {
                warnings.push(ConfigWarning {
                    field: "taskwarrior.launchers.match".into(),
                    message: "empty match would fire for every started task".into(),
                    severity: WarningSeverity::Error,
                    hint: None,
                });
            }
        }
        for rule in &self.taskwarrior.sessions {
            if rule.pattern.trim().is_empty() {
                warnings.push(ConfigWarning {
                    field: format!("taskwarrior.sessions.{}.match", rule.project),
                    message: "empty match would fire for every started task".into(),
                    severity: WarningSeverity::Error,
                    hint: None,
                });
            }
        }

        // ── tmux ───
        if self.tmux.max_parallel == 0 {
            warnings.push(ConfigWarning {
                field: "tmux.max_parallel".into(),
                message: "max_parallel is 0".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 10".into()),
            });
        }

        // ── Logging format ───
        let valid_formats = ["pretty", "json", "compact"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.format".into(),
                message: format!("unknown log format '{}'", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_formats.join(", "))),
            });
        }

        // ── Logging level ───
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.level".into(),
                message: format!("unknown log level '{}'", self.logging.level),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_levels.join(", "))),
            });
        }

        // Check for hard errors
        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| format!("{}: {}", w.field, w.message))
            .collect();

        if !errors.is_empty() {
            return Err(format!("Configuration errors:\n  • {}", errors.join("\n  • ")));
        }

        Ok(warnings)
    }
}
