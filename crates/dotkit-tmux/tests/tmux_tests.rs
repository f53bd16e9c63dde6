#[cfg(test)]
mod tests {
    use dotkit_config::schema::TmuxConfig;
    use dotkit_core::mock::{MockReply, MockRunner};
    use dotkit_core::{CommandOutput, DotkitError};
    use dotkit_tmux::*;

    fn send(target: &str, keys: &str) -> Vec<String> {
        ["tmux", "send-keys", "-t", target, keys]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    // ── Broadcast ──────────────────────────────────────────────

    #[tokio::test]
    async fn test_agents_mode_targets_named_panes_only() {
        let runner = MockRunner::new()
            .on_stdout("tmux", "poke:1.1 developer\npoke:1.2 \npoke:1.3 minimi\nclaude:1.1 \n");
        let report = broadcast(&runner, BroadcastMode::Agents, Some("test message"), &TmuxConfig::default())
            .await
            .unwrap();

        assert_eq!(report.delivered, vec!["poke:1.1", "poke:1.3"]);
        assert!(runner.was_called_with(&[
            "tmux",
            "list-panes",
            "-a",
            "-F",
            "#{session_name}:#{window_index}.#{pane_index} #{?#{@agent_name},#{@agent_name},}",
        ]));
        let sends: Vec<Vec<String>> = runner.argvs().into_iter().skip(1).collect();
        assert_eq!(
            sends,
            vec![
                send("poke:1.1", "test message"),
                send("poke:1.1", "C-m"),
                send("poke:1.3", "test message"),
                send("poke:1.3", "C-m"),
            ]
        );
    }

    #[tokio::test]
    async fn test_default_mode_checks_process_tree() {
        let runner = MockRunner::new()
            .on_stdout("tmux", "poke:1.1 1234\npoke:1.2 5678\n")
            .on_stdout("ps", "bash /home/me/bin/__claude_with_monitor.sh\n")
            .on_stdout("ps", "some_other_process\n");
        let report = broadcast(&runner, BroadcastMode::Monitored, Some("test message"), &TmuxConfig::default())
            .await
            .unwrap();

        assert_eq!(report.delivered, vec!["poke:1.1"]);
        assert!(runner.was_called_with(&["ps", "--ppid", "1234", "-p", "1234", "-o", "args="]));
        assert!(runner.was_called_with(&["tmux", "send-keys", "-t", "poke:1.1", "test message"]));
        assert!(!runner.was_called_with(&["tmux", "send-keys", "-t", "poke:1.2", "test message"]));
    }

    #[tokio::test]
    async fn test_no_targets_is_an_error() {
        let runner = MockRunner::new().on_stdout("tmux", "poke:1.1 \npoke:1.2 \n");
        let err = broadcast(&runner, BroadcastMode::Agents, None, &TmuxConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DotkitError::NotFound(_)));
        assert_eq!(runner.argvs().len(), 1);
    }

    #[tokio::test]
    async fn test_default_message_when_none_given() {
        let runner = MockRunner::new().on_stdout("tmux", "poke:1.1 developer");
        broadcast(&runner, BroadcastMode::Agents, Some("   "), &TmuxConfig::default())
            .await
            .unwrap();
        assert!(runner.was_called_with(&[
            "tmux",
            "send-keys",
            "-t",
            "poke:1.1",
            "read my broadcast and keep collaborating",
        ]));
    }

    #[tokio::test]
    async fn test_failed_pane_does_not_stop_broadcast() {
        let runner = MockRunner::new()
            .on_stdout("tmux", "a:1.1 dev\nb:1.1 ops\n")
            .on("tmux", MockReply::Output(CommandOutput::failed(1, "can't find pane")));
        let report = broadcast(&runner, BroadcastMode::Agents, Some("hi"), &TmuxConfig::default())
            .await
            .unwrap();
        assert_eq!(report.failed, vec!["a:1.1"]);
        assert_eq!(report.delivered, vec!["b:1.1"]);
    }

    // ── Registered sessions ────────────────────────────────────

    fn registry() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("claude_broadcast_1.json"),
            r#"{"session":"main","window":1,"pane":1,"pid":100,"instance_id":"x1"}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("claude_broadcast_2.json"),
            r#"{"session":"work","window":"2","pane":"0","pid":200}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("claude_broadcast_3.json"), "{broken").unwrap();
        std::fs::write(dir.path().join("other.json"), r#"{"session":"nope","window":0,"pane":0}"#).unwrap();
        dir
    }

    #[test]
    fn test_load_sessions_skips_broken_files() {
        let dir = registry();
        let sessions = load_sessions(dir.path(), "claude_broadcast_").unwrap();
        let addrs: Vec<String> = sessions.iter().map(|s| s.address().to_string()).collect();
        assert_eq!(addrs, vec!["main:1.1", "work:2.0"]);
        assert_eq!(sessions[0].instance_id.as_deref(), Some("x1"));
        assert!(sessions[0].file.ends_with("claude_broadcast_1.json"));
    }

    #[test]
    fn test_missing_registry_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_sessions(&dir.path().join("nope"), "claude_broadcast_").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_to_sessions_without_enter() {
        let dir = registry();
        let sessions = load_sessions(dir.path(), "claude_broadcast_").unwrap();
        let runner = MockRunner::new();

        let summary = send_to_sessions(&runner, &sessions, "Hello Claude!", 10).await;
        assert_eq!(summary.summary_line(), "Broadcast to 2/2 session(s)");
        assert!(runner.was_called_with(&["tmux", "send-keys", "-t", "main:1.1", "Hello Claude!"]));
        assert!(runner.was_called_with(&["tmux", "send-keys", "-t", "work:2.0", "Hello Claude!"]));
        assert!(runner.argvs().iter().all(|argv| argv.last().map(String::as_str) != Some("C-m")));
    }

    #[tokio::test]
    async fn test_send_with_single_permit_still_reaches_all() {
        let dir = registry();
        let sessions = load_sessions(dir.path(), "claude_broadcast_").unwrap();
        let runner = MockRunner::new().with_failure(1, "no such session");

        let summary = send_to_sessions(&runner, &sessions, "x", 0).await;
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.sent.len(), 1);
        assert_eq!(summary.failed.len(), 1);
    }

    #[tokio::test]
    async fn test_current_pane_only_inside_tmux() {
        let runner = MockRunner::new().with_stdout("main:1.1\n");
        assert_eq!(current_pane(&runner, false).await, None);
        assert!(runner.argvs().is_empty());

        let pane = current_pane(&runner, true).await;
        assert_eq!(pane, Some(PaneAddress::new("main", "1", "1")));
    }
}
