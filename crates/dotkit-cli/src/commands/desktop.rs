use std::process::ExitCode;

use chrono::Local;
use tracing::info;

use dotkit_config::DotkitConfig;
use dotkit_core::{Result, SystemRunner};
use dotkit_desktop::{Desktop, MusicDownload, macros};

use super::MacroAction;

pub(super) async fn cmd_macro(config: &DotkitConfig, action: MacroAction) -> Result<ExitCode> {
    let runner = SystemRunner::new();
    let desktop = Desktop::new(&runner, &config.desktop);

    match action {
        MacroAction::PasteTemplate { template } => macros::paste_template(&desktop, template).await?,
        MacroAction::InsertDate => macros::insert_date(&desktop, Local::now().date_naive()).await?,
        MacroAction::RandomString { length } => macros::type_random_string(&desktop, length).await?,
        MacroAction::MarkdownLink => macros::paste_markdown_link(&desktop).await?,
        MacroAction::CopyUrlMarkdown => {
            let link = macros::copy_url_markdown(&desktop).await?;
            info!(copied = link.is_some(), "copy-url-markdown");
        }
        MacroAction::EmbedYoutube => {
            let embed = macros::embed_youtube(&desktop).await?;
            info!(copied = embed.is_some(), "embed-youtube");
        }
        MacroAction::SearchSelection => macros::search_selection(&desktop).await?,
        MacroAction::PasteLink => macros::paste_link(&desktop).await?,
        MacroAction::CreateTask => {
            if let Some(task) = macros::create_task(&desktop).await? {
                info!(description = %task.description, project = %task.project, "task created");
            }
        }
        MacroAction::PlaylistAdd => {
            let added = macros::playlist_add(&desktop, &config.playlist).await?;
            info!(added, "playlist-add");
        }
        MacroAction::DownloadMusic => match macros::download_music(&desktop, &config.playlist).await? {
            Some(MusicDownload::Started(title)) => info!(%title, "download started"),
            Some(MusicDownload::AlreadyExists(title)) => info!(%title, "already downloaded"),
            Some(MusicDownload::NotYoutube) | None => info!("nothing to download"),
        },
        MacroAction::ToggleConky => {
            let state = macros::toggle_conky(&desktop).await?;
            info!(?state, "conky toggled");
        }
    }
    Ok(ExitCode::SUCCESS)
}
