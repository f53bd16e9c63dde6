use dotkit_config::schema::{LaunchAction, TaskwarriorConfig};

/// Markdown overview of what the launcher and tmuxinator hooks do.
pub fn render_automations(config: &TaskwarriorConfig) -> String {
    let mut out = String::from("# Taskwarrior Automations\n\n## Task-based\n\n");
    for rule in &config.launchers {
        let action = match &rule.action {
            LaunchAction::OpenUrl { url } => url.clone(),
            LaunchAction::FocusWindow { class_name } => format!("Open {class_name}"),
        };
        out.push_str(&format!("- **{}**\n  - {}\n", rule.pattern, action));
    }

    out.push_str("\n## Sessions\n\n");
    for rule in &config.sessions {
        out.push_str(&format!(
            "- **{}**\n  - tmuxinator {}\n",
            rule.pattern, rule.project
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_defaults() {
        let md = render_automations(&TaskwarriorConfig::default());
        assert!(md.starts_with("# Taskwarrior Automations\n\n## Task-based\n\n"));
        assert!(md.contains("- **check github notifications**\n  - https://github.com/notifications\n"));
        assert!(md.contains("- **respond to slack messages**\n  - Open Slack\n"));
        assert!(md.contains("## Sessions\n\n- **fill standup forms**\n  - tmuxinator standup\n"));
    }
}
