//! Subprocess execution.
//!
//! Everything in dotkit that talks to `tmux`, `task`, `xdotool`, `zenity`
//! and friends goes through a [`CommandRunner`], so tests can swap in
//! [`crate::mock::MockRunner`] and assert on the exact argv.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::{DotkitError, Result};

/// A fully described subprocess invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Text piped to the child's stdin.
    pub stdin: Option<String>,
    /// Extra environment variables.
    pub env: Vec<(String, String)>,
    /// Kill the child if it runs longer than this.
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            env: Vec::new(),
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The argv as a single vector, program first.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

/// Captured result of a finished subprocess.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the child was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// A successful output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed output with the given exit code and stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Runs external programs.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion and capture stdout/stderr. A nonzero exit is not an
    /// error at this level; see [`run_checked`].
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    /// Start the program detached from our stdio and return immediately.
    async fn spawn(&self, spec: &CommandSpec) -> Result<()>;
}

/// Run a command and return its stdout, turning a nonzero exit into
/// [`DotkitError::CommandFailed`].
pub async fn run_checked(runner: &dyn CommandRunner, spec: &CommandSpec) -> Result<String> {
    let output = runner.run(spec).await?;
    if output.success() {
        Ok(output.stdout)
    } else {
        Err(DotkitError::CommandFailed {
            program: spec.program.clone(),
            code: output.code,
            stderr: output.stderr.trim().to_string(),
        })
    }
}

/// [`CommandRunner`] backed by `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }

    fn command(spec: &CommandSpec) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&spec.program);
        cmd.args(&spec.args);
        for (k, v) in &spec.env {
            cmd.env(k, v);
        }
        cmd
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        debug!(command = %spec, "running");
        let mut cmd = Self::command(spec);
        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if spec.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| DotkitError::Command {
            program: spec.program.clone(),
            reason: e.to_string(),
        })?;

        // Feed stdin while the output is drained, so neither pipe can fill up
        // and stall the child outside the timeout.
        let pipe = child.stdin.take();
        let input = spec.stdin.clone();
        let feed = async move {
            let (Some(mut pipe), Some(input)) = (pipe, input) else {
                return Ok(());
            };
            // Dropping the pipe at the end closes it so the child sees EOF.
            match pipe.write_all(input.as_bytes()).await {
                // The child stopped reading; report its exit status instead.
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
                other => other,
            }
        };
        let wait = async move {
            let (fed, output) = tokio::join!(feed, child.wait_with_output());
            fed.and(output)
        };

        // On timeout the future is dropped, and kill_on_drop reaps the child.
        let output = match spec.timeout {
            Some(limit) => tokio::time::timeout(limit, wait).await.map_err(|_| {
                DotkitError::CommandTimeout {
                    program: spec.program.clone(),
                    secs: limit.as_secs(),
                }
            })??,
            None => wait.await?,
        };

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn spawn(&self, spec: &CommandSpec) -> Result<()> {
        debug!(command = %spec, "spawning detached");
        let mut cmd = Self::command(spec);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd.spawn().map_err(|e| DotkitError::Command {
            program: spec.program.clone(),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}
