#[cfg(test)]
mod tests {
    use dotkit_core::mock::{MockReply, MockRunner};
    use dotkit_core::*;

    // ── Error tests ────────────────────────────────────────────

    #[test]
    fn test_error_display() {
        let err = DotkitError::Hook("bad before line".into());
        assert!(err.to_string().contains("bad before line"));
    }

    #[test]
    fn test_error_command_failed_with_code() {
        let err = DotkitError::CommandFailed {
            program: "task".into(),
            code: Some(2),
            stderr: "No matches.".into(),
        };
        let s = err.to_string();
        assert!(s.contains("task"));
        assert!(s.contains('2'));
        assert!(s.contains("No matches."));
    }

    #[test]
    fn test_error_command_failed_by_signal() {
        let err = DotkitError::CommandFailed {
            program: "claude".into(),
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("signal"));
    }

    #[test]
    fn test_error_timeout() {
        let err = DotkitError::CommandTimeout {
            program: "claude".into(),
            secs: 120,
        };
        assert!(err.to_string().contains("120"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DotkitError = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: DotkitError = json_err.into();
        assert!(matches!(err, DotkitError::Serialization(_)));
    }

    // ── MockRunner tests ───────────────────────────────────────

    #[tokio::test]
    async fn test_mock_runner_fifo_replies() {
        let runner = MockRunner::new()
            .with_stdout("first")
            .with_failure(1, "second failed");

        let a = runner.run(&CommandSpec::new("x")).await.unwrap();
        let b = runner.run(&CommandSpec::new("y")).await.unwrap();
        let c = runner.run(&CommandSpec::new("z")).await.unwrap();

        assert_eq!(a.stdout, "first");
        assert!(!b.success());
        assert_eq!(b.stderr, "second failed");
        // Exhausted queue falls back to an empty success.
        assert!(c.success());
        assert_eq!(runner.argvs().len(), 3);
    }

    #[tokio::test]
    async fn test_mock_runner_program_specific_replies() {
        let runner = MockRunner::new()
            .with_stdout("generic")
            .on_stdout("ps", "__claude_with_monitor.sh");

        let ps = runner.run(&CommandSpec::new("ps")).await.unwrap();
        let other = runner.run(&CommandSpec::new("tmux")).await.unwrap();

        assert_eq!(ps.stdout, "__claude_with_monitor.sh");
        assert_eq!(other.stdout, "generic");
    }

    #[tokio::test]
    async fn test_mock_runner_error_reply() {
        let runner = MockRunner::new().on("claude", MockReply::Error("not installed".into()));
        let err = runner.run(&CommandSpec::new("claude")).await.unwrap_err();
        assert!(matches!(err, DotkitError::Command { .. }));
    }

    #[tokio::test]
    async fn test_mock_runner_records_spawns_separately() {
        let runner = MockRunner::new();
        runner
            .spawn(&CommandSpec::new("tmuxinator").args(["start", "standup"]))
            .await
            .unwrap();
        assert!(runner.argvs().is_empty());
        assert_eq!(runner.spawned_argvs(), vec![vec!["tmuxinator", "start", "standup"]]);
    }

    #[tokio::test]
    async fn test_run_checked_with_mock() {
        let runner = MockRunner::new().with_stdout("ok\n").with_failure(2, "nope");
        let out = run_checked(&runner, &CommandSpec::new("task")).await.unwrap();
        assert_eq!(out, "ok\n");
        let err = run_checked(&runner, &CommandSpec::new("task")).await.unwrap_err();
        assert!(matches!(err, DotkitError::CommandFailed { code: Some(2), .. }));
    }

    #[tokio::test]
    async fn test_was_called_with() {
        let runner = MockRunner::new();
        runner
            .run(&CommandSpec::new("tmux").args(["send-keys", "-t", "poke:1.1", "C-m"]))
            .await
            .unwrap();
        assert!(runner.was_called_with(&["tmux", "send-keys", "-t", "poke:1.1", "C-m"]));
        assert!(!runner.was_called_with(&["tmux", "send-keys"]));
    }
}
