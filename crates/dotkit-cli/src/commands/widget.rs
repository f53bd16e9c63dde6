use std::process::ExitCode;
use std::time::Duration;

use chrono::{Local, Utc};
use tracing::warn;

use dotkit_config::DotkitConfig;
use dotkit_core::{HttpFetcher, Result};
use dotkit_widgets::{DebounceState, OutputFormat, claude, status, weather};

use super::WidgetKind;

const USER_AGENT: &str = concat!("dotkit/", env!("CARGO_PKG_VERSION"));

pub(super) async fn cmd_widget(config: &DotkitConfig, kind: WidgetKind, format: OutputFormat) -> Result<ExitCode> {
    let frame = match kind {
        WidgetKind::Status => status_frame(config, format).await?,
        WidgetKind::Weather => weather_frame(config, format).await?,
        WidgetKind::Claude => claude_frame(config, format)?,
    };
    println!("{}", frame.trim_end_matches('\n'));
    Ok(ExitCode::SUCCESS)
}

fn clock() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

async fn status_frame(config: &DotkitConfig, format: OutputFormat) -> Result<String> {
    let cfg = &config.status;
    let fetcher = HttpFetcher::new(Duration::from_secs(cfg.timeout_secs), &cfg.user_agent)?;
    let mut reports = status::check_all(&fetcher, &cfg.services).await;

    let mut state = DebounceState::load(&cfg.state_file);
    state.apply(&mut reports, cfg.debounce_cycles);
    // A lost state write only weakens debouncing for the next run.
    if let Err(e) = state.save(&cfg.state_file, Utc::now()) {
        warn!(path = %cfg.state_file.display(), error = %e, "cannot save status state");
    }

    Ok(match format {
        OutputFormat::Argos => status::render_argos(&reports, &clock()),
        OutputFormat::Waybar => status::render_waybar(&reports).to_json(),
    })
}

async fn weather_frame(config: &DotkitConfig, format: OutputFormat) -> Result<String> {
    let cfg = &config.weather;
    let key = config.services.weather_api_key.as_deref();
    let fetcher = HttpFetcher::new(Duration::from_secs(cfg.timeout_secs), USER_AGENT)?;
    Ok(match format {
        OutputFormat::Argos => weather::weather_argos(&fetcher, cfg, key, Local::now().fixed_offset()).await,
        OutputFormat::Waybar => weather::weather_waybar(&fetcher, cfg, key).await.to_json(),
    })
}

fn claude_frame(config: &DotkitConfig, format: OutputFormat) -> Result<String> {
    let scan = claude::scan(&config.notifications.dir)?;
    Ok(match format {
        OutputFormat::Argos => claude::render_argos(&scan, &clock()),
        OutputFormat::Waybar => claude::render_waybar(&scan).to_json(),
    })
}
