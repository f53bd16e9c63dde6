use std::io::Read;
use std::process::ExitCode;
use std::time::Duration;

use dotkit_config::DotkitConfig;
use dotkit_core::{HttpFetcher, Result};
use dotkit_tools::{chatgpt, killercoda, lint, search, youtube};

use super::{ToolAction, joined, report_failure};

const USER_AGENT: &str = concat!("dotkit/", env!("CARGO_PKG_VERSION"));
const API_TIMEOUT: Duration = Duration::from_secs(60);

pub(super) async fn cmd_tool(config: &DotkitConfig, action: ToolAction) -> Result<ExitCode> {
    match action {
        ToolAction::LintCommand => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            let outcome = match lint::lint_hook_payload(&raw) {
                Ok(outcome) => outcome,
                Err(e) => return Ok(report_failure(&e)),
            };
            eprint!("{}", outcome.report());
            Ok(ExitCode::from(outcome.exit_code()))
        }
        ToolAction::ChatgptExport { input, out } => {
            let written = chatgpt::export(&input, &out)?;
            println!("Exported {} conversation(s) to {}", written.len(), out.display());
            Ok(ExitCode::SUCCESS)
        }
        ToolAction::KillercodaStep { title, dir } => {
            let step = killercoda::add_step(&dir, &joined(&title))?;
            println!("Added step '{}': {}", step.title, step.text);
            Ok(ExitCode::SUCCESS)
        }
        ToolAction::Search { query, model } => {
            let fetcher = HttpFetcher::new(API_TIMEOUT, USER_AGENT)?;
            let key = config.services.perplexity_api_key.as_deref();
            println!("{}", search::search(&fetcher, key, &joined(&query), &model).await?);
            Ok(ExitCode::SUCCESS)
        }
        ToolAction::YoutubeCatalog => {
            let fetcher = HttpFetcher::new(API_TIMEOUT, USER_AGENT)?;
            let catalog = youtube::catalog(
                &fetcher,
                youtube::API_BASE,
                config.services.youtube_api_key.as_deref(),
                config.services.youtube_channel_id.as_deref(),
            )
            .await?;
            print!("{}", catalog.render());
            Ok(ExitCode::SUCCESS)
        }
    }
}
