#[cfg(test)]
mod tests {
    use dotkit_config::schema::*;
    use dotkit_config::{ConfigLoader, envrc_value};
    use std::io::Write;
    use std::path::PathBuf;

    // ── Default tests ──────────────────────────────────────────

    #[test]
    fn test_dotkit_config_defaults() {
        let config = DotkitConfig::default();
        assert_eq!(config.status.debounce_cycles, 2);
        assert_eq!(config.status.timeout_secs, 5);
        assert_eq!(config.weather.location, "Mittelbuchen");
        assert_eq!(config.weather.units, Units::Metric);
        assert_eq!(config.tmux.default_message, "read my broadcast and keep collaborating");
        assert_eq!(config.tmux.monitor_process, "__claude_with_monitor.sh");
    }

    #[test]
    fn test_organizer_config_defaults() {
        let config = OrganizerConfig::default();
        assert_eq!(config.command, "claude");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.base_delay_ms, 2000);
        assert!(!config.categories.is_empty());
    }

    #[test]
    fn test_status_defaults_cover_known_services() {
        let config = StatusConfig::default();
        let names: Vec<&str> = config.services.iter().map(|s| s.name.as_str()).collect();
        for expected in ["AWS", "GCP", "Azure", "GitHub", "Netlify", "Linear", "GoDaddy", "Claude"] {
            assert!(names.contains(&expected), "missing {expected}");
        }
        let gh = config.services.iter().find(|s| s.name == "GitHub").unwrap();
        assert_eq!(gh.kind, ServiceKind::Statuspage);
    }

    #[test]
    fn test_taskwarrior_defaults() {
        let config = TaskwarriorConfig::default();
        assert_eq!(config.started_tag, "started");
        assert!(config.completed_clear_tags.contains(&"review".to_string()));
        assert!(config.priority_tags.iter().any(|p| p.tag == "review"));
        assert_eq!(config.sessions[0].project, "standup");
    }

    #[test]
    fn test_logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, "compact");
        assert!(config.file.is_none());
    }

    #[test]
    fn test_units_suffixes() {
        assert_eq!(Units::Metric.temperature_suffix(), "°C");
        assert_eq!(Units::Imperial.temperature_suffix(), "°F");
        assert_eq!(Units::Imperial.speed_suffix(), "mph");
        assert_eq!(Units::Standard.as_query(), "standard");
    }

    // ── TOML roundtrip tests ───────────────────────────────────

    #[test]
    fn test_config_toml_roundtrip() {
        let config = DotkitConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let restored: DotkitConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(restored.status.services.len(), config.status.services.len());
        assert_eq!(restored.taskwarrior.launchers, config.taskwarrior.launchers);
        assert_eq!(restored.weather.location, config.weather.location);
    }

    #[test]
    fn test_partial_toml_applies_defaults() {
        let toml_str = r#"
[weather]
location = "Berlin"
units = "imperial"

[status]
debounce_cycles = 3
"#;
        let config: DotkitConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.weather.location, "Berlin");
        assert_eq!(config.weather.units, Units::Imperial);
        assert_eq!(config.status.debounce_cycles, 3);
        // Defaults should fill in
        assert_eq!(config.status.timeout_secs, 5);
        assert_eq!(config.playlist.organizer.max_attempts, 3);
        assert!(!config.status.services.is_empty());
    }

    #[test]
    fn test_launcher_rules_deserialize() {
        let toml_str = r#"
[[taskwarrior.launchers]]
match = "meeting with denise"
action = "open_url"
url = "https://meet.example.com/denise"

[[taskwarrior.launchers]]
match = "respond to slack messages"
action = "focus_window"
class_name = "Slack"
"#;
        let config: DotkitConfig = toml::from_str(toml_str).unwrap();
        let rules = &config.taskwarrior.launchers;
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].pattern, "meeting with denise");
        assert_eq!(
            rules[0].action,
            LaunchAction::OpenUrl {
                url: "https://meet.example.com/denise".into()
            }
        );
        assert_eq!(
            rules[1].action,
            LaunchAction::FocusWindow {
                class_name: "Slack".into()
            }
        );
    }

    #[test]
    fn test_service_entries_deserialize() {
        let toml_str = r#"
[[status.services]]
name = "Example"
kind = "statuspage"
api = "https://status.example.com/api/v2/status.json"
page = "https://status.example.com/"
"#;
        let config: DotkitConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.status.services.len(), 1);
        assert_eq!(config.status.services[0].kind, ServiceKind::Statuspage);
    }

    // ── Validation tests ───────────────────────────────────────

    #[test]
    fn test_default_config_validates() {
        let config = DotkitConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_service_names() {
        let mut config = DotkitConfig::default();
        let dup = config.status.services[0].clone();
        config.status.services.push(dup);
        let err = config.validate().unwrap_err();
        assert!(err.contains("duplicate service name"));
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = DotkitConfig::default();
        config.playlist.organizer.max_attempts = 0;
        let err = config.validate().unwrap_err();
        assert!(err.starts_with("Configuration errors:"));
        assert!(err.contains("playlist.organizer.max_attempts"));
    }

    #[test]
    fn test_validate_warns_on_unknown_log_format() {
        let mut config = DotkitConfig::default();
        config.logging.format = "xml".into();
        let warnings = config.validate().unwrap();
        assert!(warnings
            .iter()
            .any(|w| w.field == "logging.format" && w.severity == WarningSeverity::Warning));
    }

    #[test]
    fn test_warning_display_has_hint() {
        let w = ConfigWarning {
            field: "tmux.max_parallel".into(),
            message: "max_parallel is 0".into(),
            severity: WarningSeverity::Error,
            hint: Some("Set to e.g. 10".into()),
        };
        let s = w.to_string();
        assert!(s.contains("tmux.max_parallel"));
        assert!(s.contains("↳ Set to e.g. 10"));
    }

    // ── envrc tests ────────────────────────────────────────────

    #[test]
    fn test_envrc_value_plain_and_export() {
        assert_eq!(envrc_value("WEATHER_API_KEY=abc\n", "WEATHER_API_KEY").as_deref(), Some("abc"));
        assert_eq!(
            envrc_value("# keys\nexport WEATHER_API_KEY=\"quoted\"\n", "WEATHER_API_KEY").as_deref(),
            Some("quoted")
        );
        assert_eq!(envrc_value("OTHER=1\n", "WEATHER_API_KEY"), None);
        assert_eq!(envrc_value("WEATHER_API_KEY=\n", "WEATHER_API_KEY"), None);
    }

    #[test]
    fn test_envrc_fallback_only_fills_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let envrc = dir.path().join(".envrc");
        std::fs::write(&envrc, "export WEATHER_API_KEY=from-envrc\n").unwrap();

        let mut config = DotkitConfig::default();
        config.services.weather_api_key = None;
        let filled = ConfigLoader::apply_envrc_fallback(config, Some(envrc.clone()));
        assert_eq!(filled.services.weather_api_key.as_deref(), Some("from-envrc"));

        let mut config = DotkitConfig::default();
        config.services.weather_api_key = Some("from-config".into());
        let kept = ConfigLoader::apply_envrc_fallback(config, Some(envrc));
        assert_eq!(kept.services.weather_api_key.as_deref(), Some("from-config"));
    }

    #[test]
    fn test_envrc_fallback_missing_file() {
        let mut config = DotkitConfig::default();
        config.services.weather_api_key = None;
        let out = ConfigLoader::apply_envrc_fallback(config, Some(PathBuf::from("/nonexistent/.envrc")));
        assert!(out.services.weather_api_key.is_none());
    }

    // ── ConfigLoader tests ─────────────────────────────────────

    #[test]
    fn test_config_loader_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("dotkit.toml");
        let mut f = std::fs::File::create(&config_path).unwrap();
        writeln!(
            f,
            r#"
[playlist]
path = "{}/playlist.m3u"

[tmux]
max_parallel = 4

[services]
weather_api_key = "k"
"#,
            dir.path().display()
        )
        .unwrap();

        let loader = ConfigLoader::load(Some(config_path.as_path())).unwrap();
        let config = loader.get();
        assert_eq!(config.playlist.path, dir.path().join("playlist.m3u"));
        assert_eq!(config.tmux.max_parallel, 4);
        assert_eq!(config.services.weather_api_key.as_deref(), Some("k"));
        assert_eq!(loader.path(), config_path.as_path());
    }

    #[test]
    fn test_config_loader_missing_file_uses_defaults() {
        let loader = ConfigLoader::load(Some(std::path::Path::new("/nonexistent/dotkit.toml"))).unwrap();
        assert_eq!(loader.get().status.debounce_cycles, 2);
    }

    #[test]
    fn test_config_loader_rejects_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("dotkit.toml");
        std::fs::write(&config_path, "[status\ndebounce_cycles = ").unwrap();
        let err = ConfigLoader::load(Some(config_path.as_path())).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn test_config_loader_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("dotkit.toml");
        std::fs::write(&config_path, "[tmux]\nmax_parallel = 0\n").unwrap();
        let err = ConfigLoader::load(Some(config_path.as_path())).unwrap_err();
        assert!(err.to_string().contains("tmux.max_parallel"));
    }

    #[test]
    fn test_resolve_path_prefers_explicit() {
        let p = ConfigLoader::resolve_path(Some(std::path::Path::new("/etc/dotkit.toml")));
        assert_eq!(p, PathBuf::from("/etc/dotkit.toml"));
    }

    #[test]
    fn test_loader_expands_home() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("dotkit.toml");
        std::fs::write(&config_path, "[playlist]\npath = \"~/list.m3u\"\n").unwrap();
        let config = ConfigLoader::load(Some(config_path.as_path())).unwrap().get();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.playlist.path, home.join("list.m3u"));
        }
    }

    // ── JSON roundtrip ─────────────────────────────────────────

    #[test]
    fn test_config_json_roundtrip() {
        let config = DotkitConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: DotkitConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.tmux.registry_prefix, config.tmux.registry_prefix);
    }
}
