//! Mock command runner for deterministic testing.
//!
//! Returns pre-configured outputs without starting any process and records
//! every invocation so tests can assert on the exact argv.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::process::{CommandOutput, CommandRunner, CommandSpec};
use crate::{DotkitError, Result};

/// A queued reply for the mock runner.
#[derive(Debug, Clone)]
pub enum MockReply {
    Output(CommandOutput),
    /// Simulate the program failing to start (or timing out).
    Error(String),
}

/// A [`CommandRunner`] that replays queued replies.
///
/// Replies registered with [`MockRunner::on`] are matched by program name
/// first; anything else is served from the FIFO queue. When nothing matches,
/// the call succeeds with empty output.
///
/// # Example
/// ```
/// use dotkit_core::mock::MockRunner;
/// let runner = MockRunner::new()
///     .with_stdout("poke:1.1 developer");
/// ```
#[derive(Clone, Default)]
pub struct MockRunner {
    queue: Arc<Mutex<VecDeque<MockReply>>>,
    by_program: Arc<Mutex<Vec<(String, VecDeque<MockReply>)>>>,
    /// Every `run` call, in order.
    pub calls: Arc<Mutex<Vec<CommandSpec>>>,
    /// Every `spawn` call, in order.
    pub spawned: Arc<Mutex<Vec<CommandSpec>>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply with the given stdout.
    pub fn with_stdout(self, stdout: &str) -> Self {
        self.push(MockReply::Output(CommandOutput::ok(stdout)));
        self
    }

    /// Queue a reply with a nonzero exit code.
    pub fn with_failure(self, code: i32, stderr: &str) -> Self {
        self.push(MockReply::Output(CommandOutput::failed(code, stderr)));
        self
    }

    /// Queue a start failure.
    pub fn with_error(self, message: &str) -> Self {
        self.push(MockReply::Error(message.to_string()));
        self
    }

    /// Queue a reply that is only handed to calls of `program`.
    pub fn on(self, program: &str, reply: MockReply) -> Self {
        {
            let mut map = self.by_program.lock().unwrap();
            match map.iter_mut().find(|(p, _)| p == program) {
                Some((_, q)) => q.push_back(reply),
                None => map.push((program.to_string(), VecDeque::from([reply]))),
            }
        }
        self
    }

    /// Queue a successful stdout for `program`.
    pub fn on_stdout(self, program: &str, stdout: &str) -> Self {
        self.on(program, MockReply::Output(CommandOutput::ok(stdout)))
    }

    pub fn push(&self, reply: MockReply) {
        self.queue.lock().unwrap().push_back(reply);
    }

    /// Recorded `run` calls as argv vectors.
    pub fn argvs(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().iter().map(|c| c.argv()).collect()
    }

    /// Recorded `spawn` calls as argv vectors.
    pub fn spawned_argvs(&self) -> Vec<Vec<String>> {
        self.spawned.lock().unwrap().iter().map(|c| c.argv()).collect()
    }

    /// Whether some `run` call had exactly this argv.
    pub fn was_called_with(&self, argv: &[&str]) -> bool {
        self.argvs()
            .iter()
            .any(|call| call.iter().map(String::as_str).eq(argv.iter().copied()))
    }

    fn next_reply(&self, program: &str) -> Option<MockReply> {
        let mut map = self.by_program.lock().unwrap();
        if let Some((_, q)) = map.iter_mut().find(|(p, _)| p == program) {
            if let Some(reply) = q.pop_front() {
                return Some(reply);
            }
        }
        drop(map);
        self.queue.lock().unwrap().pop_front()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(spec.clone());
        match self.next_reply(&spec.program) {
            Some(MockReply::Output(out)) => Ok(out),
            Some(MockReply::Error(reason)) => Err(DotkitError::Command {
                program: spec.program.clone(),
                reason,
            }),
            None => Ok(CommandOutput::ok("")),
        }
    }

    async fn spawn(&self, spec: &CommandSpec) -> Result<()> {
        self.spawned.lock().unwrap().push(spec.clone());
        Ok(())
    }
}
