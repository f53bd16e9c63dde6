use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use dotkit_core::{DotkitError, expand_home};

use crate::schema::DotkitConfig;

/// Loads the dotkit configuration.
#[derive(Debug)]
pub struct ConfigLoader {
    config: DotkitConfig,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > DOTKIT_CONFIG env > ~/.config/dotkit/dotkit.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("DOTKIT_CONFIG") {
            return PathBuf::from(p);
        }
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dotkit")
            .join("dotkit.toml")
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> dotkit_core::Result<Self> {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            debug!(?config_path, "loading configuration");
            let raw = std::fs::read_to_string(&config_path)?;
            Self::parse(&raw, &config_path)?
        } else {
            info!(?config_path, "config file not found, using defaults");
            DotkitConfig::default()
        };

        let config = Self::apply_env_overrides(config);
        let config = Self::apply_envrc_fallback(config, dirs::home_dir().map(|h| h.join(".envrc")));
        let config = Self::expand_paths(config);

        // Validate config: log warnings, fail on errors
        match config.validate() {
            Ok(warnings) => {
                for w in &warnings {
                    debug!("{}", w);
                }
            }
            Err(e) => {
                return Err(DotkitError::Config(e));
            }
        }

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Parse a TOML document into a config.
    pub fn parse(raw: &str, origin: &Path) -> dotkit_core::Result<DotkitConfig> {
        toml::from_str::<DotkitConfig>(raw).map_err(|e| {
            DotkitError::Config(format!("failed to parse {}: {}", origin.display(), e))
        })
    }

    /// Get a snapshot of the loaded config.
    pub fn get(&self) -> DotkitConfig {
        self.config.clone()
    }

    /// Path the config was (or would have been) read from.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Apply env var overrides. API keys: the env var fills in when the
    /// config file doesn't set the key.
    pub fn apply_env_overrides(mut config: DotkitConfig) -> DotkitConfig {
        if let Ok(v) = std::env::var("DOTKIT_LOG_LEVEL") {
            config.logging.level = v;
        }
        if let Ok(v) = std::env::var("DOTKIT_LOG_FORMAT") {
            config.logging.format = v;
        }
        if let Ok(v) = std::env::var("DOTKIT_PLAYLIST") {
            config.playlist.path = PathBuf::from(v);
        }
        let fill = |slot: &mut Option<String>, var: &str| {
            if slot.is_none() {
                if let Ok(v) = std::env::var(var) {
                    if !v.is_empty() {
                        *slot = Some(v);
                    }
                }
            }
        };
        fill(&mut config.services.weather_api_key, "WEATHER_API_KEY");
        fill(&mut config.services.youtube_api_key, "YOUTUBE_API_KEY");
        fill(&mut config.services.youtube_channel_id, "YOUTUBE_CHANNEL_ID");
        fill(&mut config.services.perplexity_api_key, "PPLX_API_KEY");
        config
    }

    /// Desktop sessions started outside a shell don't inherit direnv
    /// exports, so the weather key is also looked up in `~/.envrc`.
    pub fn apply_envrc_fallback(mut config: DotkitConfig, envrc: Option<PathBuf>) -> DotkitConfig {
        if config.services.weather_api_key.is_some() {
            return config;
        }
        let Some(path) = envrc else {
            return config;
        };
        match std::fs::read_to_string(&path) {
            Ok(raw) => {
                config.services.weather_api_key = envrc_value(&raw, "WEATHER_API_KEY");
            }
            Err(e) => debug!(path = %path.display(), error = %e, "no envrc fallback"),
        }
        config
    }

    fn expand_paths(mut config: DotkitConfig) -> DotkitConfig {
        let p = &mut config.playlist;
        p.path = expand_home(&p.path);
        p.video_playlist = expand_home(&p.video_playlist);
        p.videos_dir = expand_home(&p.videos_dir);
        p.music_dir = expand_home(&p.music_dir);
        p.download_script = p.download_script.as_deref().map(expand_home);
        config.status.state_file = expand_home(&config.status.state_file);
        config.notifications.dir = expand_home(&config.notifications.dir);
        config.tmux.registry_dir = expand_home(&config.tmux.registry_dir);
        config.desktop.conky_config = expand_home(&config.desktop.conky_config);
        config.logging.file = config.logging.file.as_deref().map(expand_home);
        config
    }
}

/// Find `KEY=value` (optionally `export KEY=value`) in a shell env file.
pub fn envrc_value(raw: &str, key: &str) -> Option<String> {
    for line in raw.lines() {
        let line = line.trim();
        let line = line.strip_prefix("export ").unwrap_or(line).trim_start();
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        if k.trim() != key {
            continue;
        }
        let value = v.trim().trim_matches(|c| c == '\'' || c == '"');
        if value.is_empty() {
            warn!(key, "empty value in envrc");
            return None;
        }
        return Some(value.to_string());
    }
    None
}
