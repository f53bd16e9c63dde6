use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use dotkit_config::{ConfigLoader, DotkitConfig, WarningSeverity};
use dotkit_core::{DotkitError, Result};
use dotkit_desktop::Template;
use dotkit_taskwarrior::HookKind;
use dotkit_taskwarrior::report::timew::Period;
use dotkit_tmux::PaneAddress;
use dotkit_widgets::OutputFormat;

mod desktop;
mod playlist;
mod setup;
mod task;
mod tmux;
mod tools;
mod widget;

/// dotkit: desktop automation helpers for Taskwarrior, status bars, tmux and playlists
#[derive(Parser)]
#[command(name = "dotkit", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to dotkit.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Maintain the curated playlist
    Playlist {
        #[command(subcommand)]
        action: PlaylistAction,
    },
    /// Run a Taskwarrior on-modify hook (task JSON on stdin)
    Hook {
        /// started-label, review-label, priority, completed-cleanup, tmuxinator, launcher or all
        name: HookKind,
    },
    /// List the configured task automations as Markdown
    Automations,
    /// Markdown reports from task and timew
    Report {
        #[command(subcommand)]
        action: ReportAction,
    },
    /// Print one status-bar frame
    Widget {
        #[arg(value_enum)]
        kind: WidgetKind,
        /// argos or waybar
        #[arg(short, long, default_value = "argos")]
        format: OutputFormat,
    },
    /// Broadcast a message to every Claude pane and press Enter
    Snd {
        /// Target panes with an @agent_name instead of monitored panes
        #[arg(long)]
        agents: bool,
        /// Message words (defaults to the configured broadcast)
        message: Vec<String>,
    },
    /// Type keys into registered Claude sessions
    SendKeys {
        /// List registered sessions
        #[arg(long)]
        list: bool,
        /// Only this session
        #[arg(short, long)]
        session: Option<String>,
        /// Skip this pane (session:window.pane)
        #[arg(short = 'x', long)]
        exclude: Option<PaneAddress>,
        /// Keys to send
        keys: Vec<String>,
    },
    /// Run a desktop macro
    Macro {
        #[command(subcommand)]
        action: MacroAction,
    },
    /// Standalone helpers
    Tool {
        #[command(subcommand)]
        action: ToolAction,
    },
    /// Show current configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check the configuration for problems
    Doctor,
    /// Write a starter dotkit.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Generate shell completions for bash, zsh, or fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Show version and build info
    Version,
}

#[derive(Subcommand)]
enum PlaylistAction {
    /// Append a URL unless it is already listed
    Add {
        url: String,
        /// Entry title (defaults to the URL)
        #[arg(short, long, default_value = "")]
        title: String,
        /// Report what would happen without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Categorize every entry with the LLM CLI
    Organize {
        #[arg(long)]
        dry_run: bool,
    },
    /// Sort by category, then title
    Sort {
        #[arg(long)]
        dry_run: bool,
    },
    /// Drop later duplicates
    Dedupe {
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the normalized form of each URL
    Normalize {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Browser native-messaging host (framed JSON on stdin/stdout)
    NativeHost,
}

#[derive(Subcommand)]
enum ReportAction {
    /// Time tracked per project and task
    Timew {
        /// day, week or month
        #[arg(short, long, default_value = "day")]
        period: Period,
    },
    /// `task current` as Markdown checklists per project
    Tasks,
}

#[derive(Clone, Copy, ValueEnum)]
enum WidgetKind {
    /// Cloud service health
    Status,
    Weather,
    /// Pending Claude notifications
    Claude,
}

#[derive(Subcommand)]
enum MacroAction {
    /// Paste a text template
    PasteTemplate {
        /// issue, pr, it, trigger-review or email
        template: Template,
    },
    /// Type today's date
    InsertDate,
    /// Type a random alphanumeric string
    RandomString {
        #[arg(short = 'n', long, default_value_t = 6)]
        length: usize,
    },
    /// Paste [selection](clipboard)
    MarkdownLink,
    /// Copy the browser URL as a Markdown link
    CopyUrlMarkdown,
    /// Copy a YouTube thumbnail link for the browser URL
    EmbedYoutube,
    /// Search the web for the selected text
    SearchSelection,
    /// Paste a link, as a hyperlink in Google Docs
    PasteLink,
    /// Create a Taskwarrior task from a form
    CreateTask,
    /// Add the browser's YouTube URL to the playlist
    PlaylistAdd,
    /// Download the browser's YouTube URL as MP3
    DownloadMusic,
    /// Start or stop conky
    ToggleConky,
}

#[derive(Subcommand)]
enum ToolAction {
    /// PreToolUse hook suggesting better shell tools (payload on stdin)
    LintCommand,
    /// Convert a ChatGPT conversations.json to Markdown files
    ChatgptExport {
        input: PathBuf,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Add a step to the Killercoda scenario in the current directory
    KillercodaStep {
        #[arg(required = true)]
        title: Vec<String>,
        /// Scenario directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
    /// Ask Perplexity
    Search {
        #[arg(required = true)]
        query: Vec<String>,
        /// Model name
        #[arg(short, long, default_value = dotkit_tools::search::DEFAULT_MODEL)]
        model: String,
    },
    /// List a channel's videos and shorts
    YoutubeCatalog,
}

impl Cli {
    pub async fn run(self) -> Result<ExitCode> {
        // These must work without (or with a broken) config file.
        match self.command {
            Commands::Version => return Self::cmd_version(),
            Commands::Completions { shell } => return Self::cmd_completions(shell),
            Commands::Init { force } => {
                return setup::cmd_init(&ConfigLoader::resolve_path(self.config.as_deref()), force);
            }
            _ => {}
        }

        // Load config first so we can use it for log format
        let config_loader = ConfigLoader::load(self.config.as_deref())?;
        let config = config_loader.get();

        // Resolve log level: RUST_LOG > --verbose > --quiet > --log-level > config
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            self.log_level.as_deref().unwrap_or(config.logging.level.as_str())
        };
        init_tracing(&config, log_level)?;

        match self.command {
            Commands::Playlist { action } => playlist::cmd_playlist(&config, action).await,
            Commands::Hook { name } => task::cmd_hook(&config, name).await,
            Commands::Automations => task::cmd_automations(&config),
            Commands::Report { action } => task::cmd_report(&config, action).await,
            Commands::Widget { kind, format } => widget::cmd_widget(&config, kind, format).await,
            Commands::Snd { agents, message } => tmux::cmd_snd(&config, agents, message).await,
            Commands::SendKeys {
                list,
                session,
                exclude,
                keys,
            } => tmux::cmd_send_keys(&config, list, session, exclude, keys).await,
            Commands::Macro { action } => desktop::cmd_macro(&config, action).await,
            Commands::Tool { action } => tools::cmd_tool(&config, action).await,
            Commands::Config { json } => Self::cmd_config(&config, json),
            Commands::Doctor => Self::cmd_doctor(&config_loader),
            Commands::Version | Commands::Completions { .. } | Commands::Init { .. } => {
                Ok(ExitCode::SUCCESS)
            }
        }
    }

    fn cmd_config(config: &DotkitConfig, json: bool) -> Result<ExitCode> {
        if json {
            println!("{}", serde_json::to_string_pretty(config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(config).map_err(|e| DotkitError::Config(e.to_string()))?
            );
        }
        Ok(ExitCode::SUCCESS)
    }

    fn cmd_doctor(loader: &ConfigLoader) -> Result<ExitCode> {
        println!("🩺 dotkit doctor");
        println!("   config: {}", loader.path().display());
        println!();

        // Loading already rejected hard errors.
        let warnings = loader.get().validate().map_err(DotkitError::Config)?;

        let mut warn_count = 0;
        let mut info_count = 0;
        for w in &warnings {
            println!("  {w}");
            match w.severity {
                WarningSeverity::Warning => warn_count += 1,
                WarningSeverity::Info => info_count += 1,
                WarningSeverity::Error => {}
            }
        }
        if !loader.path().exists() {
            println!("  💡 no config file, defaults in use");
            println!("   ↳ Run 'dotkit init' to write one");
            info_count += 1;
        }

        println!();
        println!("  ⚠️  {warn_count} warnings, 💡 {info_count} suggestions");
        Ok(ExitCode::SUCCESS)
    }

    fn cmd_version() -> Result<ExitCode> {
        println!("dotkit v{}", env!("CARGO_PKG_VERSION"));
        println!("   Target: {}", std::env::consts::ARCH);
        println!("   OS: {}", std::env::consts::OS);
        #[cfg(debug_assertions)]
        println!("   Profile: debug");
        #[cfg(not(debug_assertions))]
        println!("   Profile: release");
        Ok(ExitCode::SUCCESS)
    }

    fn cmd_completions(shell: Shell) -> Result<ExitCode> {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "dotkit", &mut std::io::stdout());
        Ok(ExitCode::SUCCESS)
    }
}

/// Logs go to stderr, or are appended to `logging.file`. Stdout belongs to
/// widget frames and hook output.
fn init_tracing(config: &DotkitConfig, level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (writer, ansi) = match &config.logging.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
            (BoxMakeWriter::new(std::sync::Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi);
    match config.logging.format.as_str() {
        "json" => builder.json().with_target(true).init(),
        "pretty" => builder.pretty().with_target(false).init(),
        _ => builder.compact().with_target(false).init(),
    }
    Ok(())
}

/// Join free-form words given as separate arguments.
fn joined(words: &[String]) -> String {
    words.join(" ").trim().to_string()
}

/// Exit status for an error the user should see without a backtrace of
/// context: printed as `Error: ...`, exit 1.
fn report_failure(e: &DotkitError) -> ExitCode {
    eprintln!("Error: {e}");
    ExitCode::FAILURE
}
