use std::path::Path;
use std::process::ExitCode;

use dotkit_config::ConfigLoader;
use dotkit_core::{Result, atomic_write};

const STARTER_CONFIG: &str = r#"# dotkit configuration
# Every section is optional; omitted keys keep their defaults.
# Run 'dotkit config' to see the effective values.

[logging]
level = "warn"       # trace, debug, info, warn, error
format = "compact"   # pretty, compact, json
# file = "~/.cache/dotkit/dotkit.log"

[playlist]
path = "~/haruna_playlist.m3u"
music_dir = "~/music"
# download_script = "~/bin/download-yt"

[playlist.organizer]
command = "claude"
args = ["-p"]
max_attempts = 3

[status]
debounce_cycles = 2
# [[status.services]]
# name = "GitHub"
# kind = "statuspage"
# api = "https://www.githubstatus.com/api/v2/status.json"
# page = "https://www.githubstatus.com/"

[weather]
location = "Berlin"
units = "metric"     # metric, imperial, standard

[taskwarrior]
started_tag = "started"
browser_class = "Firefox"
# [[taskwarrior.launchers]]
# match = "check github notifications"
# action = "open_url"
# url = "https://github.com/notifications"

[tmux]
default_message = "read my broadcast and keep collaborating"
max_parallel = 10

[desktop]
search_url = "https://duckduckgo.com/?q="
# email = "me@example.com"

[services]
# weather_api_key = "..."      # or env: WEATHER_API_KEY
# youtube_api_key = "..."      # or env: YOUTUBE_API_KEY
# youtube_channel_id = "..."   # or env: YOUTUBE_CHANNEL_ID
# perplexity_api_key = "..."   # or env: PPLX_API_KEY
"#;

/// Write the starter config unless one already exists.
pub(super) fn cmd_init(path: &Path, force: bool) -> Result<ExitCode> {
    if path.exists() && !force {
        println!("⚠️  {} already exists", path.display());
        println!("   Use --force to overwrite it.");
        return Ok(ExitCode::SUCCESS);
    }
    // The template must stay loadable.
    ConfigLoader::parse(STARTER_CONFIG, path)?;
    atomic_write(path, STARTER_CONFIG)?;
    println!("✅ Wrote {}", path.display());
    Ok(ExitCode::SUCCESS)
}
