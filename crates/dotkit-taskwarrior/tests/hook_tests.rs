#[cfg(test)]
mod tests {
    use dotkit_config::schema::TaskwarriorConfig;
    use dotkit_core::mock::MockRunner;
    use dotkit_core::{CommandSpec, DotkitError};
    use dotkit_taskwarrior::report::{Period, current_tasks_markdown, timew_summary};
    use dotkit_taskwarrior::*;
    use std::io::Cursor;

    fn read(before: &str, after: &str) -> HookInput {
        HookInput::read(Cursor::new(format!("{before}\n{after}\n"))).unwrap()
    }

    // ── Hook contract ──────────────────────────────────────────

    #[test]
    fn test_tag_hooks_are_pure() {
        let cfg = TaskwarriorConfig::default();
        let before = r#"{"uuid":"1","description":"write report","status":"pending","tags":["next"]}"#;
        let after = r#"{"uuid":"1","description":"write report","status":"completed","tags":["next","review"],"start":"20241017T080000Z"}"#;
        let input = read(before, after);
        let snapshot = input.clone();

        for kind in [
            HookKind::StartedLabel,
            HookKind::ReviewLabel,
            HookKind::Priority,
            HookKind::CompletedCleanup,
        ] {
            let first = run_hook(kind, &input, &cfg);
            let second = run_hook(kind, &input, &cfg);
            assert!(first.actions.is_empty(), "{kind} requested a side effect");
            assert_eq!(first.render(), second.render(), "{kind} is not deterministic");
        }
        // Input is never mutated.
        assert_eq!(input.before, snapshot.before);
        assert_eq!(input.after, snapshot.after);
    }

    #[test]
    fn test_unchanged_task_passes_through_verbatim() {
        let cfg = TaskwarriorConfig::default();
        let task = r#"{"uuid":"1","description":"plain","priority":"H","annotations":[{"entry":"x","description":"y"}]}"#;
        let input = read(task, task);
        for kind in HookKind::ALL {
            let out = run_hook(kind, &input, &cfg);
            assert_eq!(out.render(), format!("{task}\n"), "{kind}");
        }
    }

    #[test]
    fn test_malformed_input_is_hook_error() {
        let err = HookInput::read(Cursor::new("{}\nnot json\n")).unwrap_err();
        assert!(matches!(err, DotkitError::Hook(_)));
        let err = HookInput::read(Cursor::new("")).unwrap_err();
        assert!(matches!(err, DotkitError::Hook(_)));
    }

    #[test]
    fn test_launcher_rules_from_config() {
        let cfg: TaskwarriorConfig = serde_json::from_value(serde_json::json!({
            "launchers": [
                {"match": "meeting with denise", "action": "open_url", "url": "https://meet.example/denise"}
            ],
            "browser_class": "LibreWolf"
        }))
        .unwrap();
        let input = read(
            r#"{"description":"Meeting with Denise"}"#,
            r#"{"description":"Meeting with Denise","start":"x"}"#,
        );
        let out = run_hook(HookKind::Launcher, &input, &cfg);
        assert_eq!(
            out.actions[0],
            HookAction::Spawn(CommandSpec::new("xdg-open").arg("https://meet.example/denise"))
        );
        assert!(matches!(&out.actions[1], HookAction::Spawn(s) if s.args.contains(&"LibreWolf".to_string())));
    }

    // ── Actions ────────────────────────────────────────────────

    #[tokio::test]
    async fn test_execute_focus_window() {
        let runner = MockRunner::new().on_stdout("xdotool", "41943047\n41943050\n");
        execute_actions(
            &[HookAction::FocusWindow {
                class_name: "Slack".into(),
            }],
            &runner,
        )
        .await;

        assert!(runner.was_called_with(&["xdotool", "search", "--onlyvisible", "--class", "Slack"]));
        assert_eq!(
            runner.spawned_argvs(),
            vec![
                vec!["xdotool", "windowactivate", "--sync", "41943047"],
                vec!["xdotool", "windowactivate", "41943047", "windowsize", "41943047", "100%", "100%"],
            ]
        );
    }

    #[tokio::test]
    async fn test_execute_focus_window_without_match() {
        let runner = MockRunner::new().on_stdout("xdotool", "");
        execute_actions(
            &[HookAction::FocusWindow {
                class_name: "Slack".into(),
            }],
            &runner,
        )
        .await;
        assert!(runner.spawned_argvs().is_empty());
    }

    #[tokio::test]
    async fn test_execute_spawn_failures_are_not_fatal() {
        let runner = MockRunner::new().with_failure(1, "no display");
        execute_actions(
            &[
                HookAction::FocusWindow {
                    class_name: "Slack".into(),
                },
                HookAction::Spawn(CommandSpec::new("tmuxinator").args(["start", "standup"])),
            ],
            &runner,
        )
        .await;
        assert_eq!(runner.spawned_argvs(), vec![vec!["tmuxinator", "start", "standup"]]);
    }

    // ── Reports ────────────────────────────────────────────────

    #[tokio::test]
    async fn test_timew_summary_runs_task_and_timew() {
        let runner = MockRunner::new()
            .on_stdout("task", "dotfiles\nwork-project\n")
            .on_stdout(
                "timew",
                r#"[{"id":1,"start":"20241017T080000Z","end":"20241017T083000Z","tags":["dotfiles","hooks"]}]"#,
            );
        let md = timew_summary(&runner, &TaskwarriorConfig::default(), Period::Week)
            .await
            .unwrap();
        assert!(runner.was_called_with(&["timew", "export", ":week"]));
        assert!(md.contains("Total for dotfiles: 0h 30m 0s"));
        assert!(md.contains("(week)"));
    }

    #[tokio::test]
    async fn test_timew_summary_tolerates_failed_project_listing() {
        let runner = MockRunner::new()
            .on("task", dotkit_core::mock::MockReply::Output(dotkit_core::CommandOutput::failed(1, "no db")))
            .on_stdout("timew", "[]");
        let md = timew_summary(&runner, &TaskwarriorConfig::default(), Period::Day)
            .await
            .unwrap();
        assert!(md.contains("**Overall total duration (day):** 0h 0m 0s"));
    }

    #[tokio::test]
    async fn test_current_tasks_markdown() {
        let runner = MockRunner::new().on_stdout(
            "task",
            "ID Age Project Tags Description Urg\n-- --- ------- ---- ----------- ---\n1 1d dotfiles next Port hooks 3.0\n\n1 task\n",
        );
        let md = current_tasks_markdown(&runner, &Default::default()).await.unwrap();
        assert_eq!(md, "dotfiles\n- [ ] Port hooks\n\n");
        assert!(runner.was_called_with(&["task", "current"]));
    }
}
