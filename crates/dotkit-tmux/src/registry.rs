//! Claude sessions registered through `claude_broadcast_*.json` files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use dotkit_core::{CommandRunner, DotkitError, Result};

use crate::pane::{PaneAddress, send_keys};

fn scalar(v: Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Window and pane indexes are written as numbers by some wrappers and as
/// strings by others.
fn id<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    scalar(Value::deserialize(d)?).ok_or_else(|| serde::de::Error::custom("expected a string or number"))
}

fn opt_id<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?.and_then(scalar))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisteredSession {
    pub session: String,
    #[serde(deserialize_with = "id")]
    pub window: String,
    #[serde(deserialize_with = "id")]
    pub pane: String,
    #[serde(default, deserialize_with = "opt_id")]
    pub instance_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub pid: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub start_time: Option<String>,
    #[serde(skip)]
    pub file: PathBuf,
}

impl RegisteredSession {
    pub fn address(&self) -> PaneAddress {
        PaneAddress::new(&self.session, &self.window, &self.pane)
    }

    /// `1. main:1.3 (PID: 4242)`
    pub fn list_line(&self, index: usize) -> String {
        format!(
            "{}. {} (PID: {})",
            index,
            self.address(),
            self.pid.as_deref().unwrap_or("Unknown")
        )
    }
}

/// Read every registration file in `dir` whose name starts with `prefix`,
/// ordered by file name. Unreadable files are warned about and skipped.
pub fn load_sessions(dir: &Path, prefix: &str) -> Result<Vec<RegisteredSession>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy())
                .is_some_and(|n| n.starts_with(prefix) && n.ends_with(".json"))
        })
        .collect();
    files.sort();

    let mut sessions = Vec::new();
    for path in files {
        let parsed = std::fs::read_to_string(&path)
            .map_err(DotkitError::from)
            .and_then(|raw| serde_json::from_str::<RegisteredSession>(&raw).map_err(DotkitError::from));
        match parsed {
            Ok(mut session) => {
                session.file = path;
                sessions.push(session);
            }
            Err(e) => warn!(file = %path.display(), error = %e, "skipping unreadable registration"),
        }
    }
    Ok(sessions)
}

/// Drop the caller's own pane and any excluded pane, then apply the
/// optional session-name filter.
pub fn select_targets(
    sessions: Vec<RegisteredSession>,
    current: Option<&PaneAddress>,
    exclude: Option<&PaneAddress>,
    session: Option<&str>,
) -> Result<Vec<RegisteredSession>> {
    let remaining: Vec<RegisteredSession> = sessions
        .into_iter()
        .filter(|s| {
            let addr = s.address();
            if current == Some(&addr) {
                info!(pane = %addr, "skipping current pane");
                return false;
            }
            exclude != Some(&addr)
        })
        .collect();

    match session {
        Some(name) => {
            let matched: Vec<RegisteredSession> =
                remaining.into_iter().filter(|s| s.session == name).collect();
            if matched.is_empty() {
                return Err(DotkitError::NotFound(format!("session '{name}' not found")));
            }
            Ok(matched)
        }
        None => Ok(remaining),
    }
}

/// Outcome of a parallel send.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendSummary {
    pub sent: Vec<PaneAddress>,
    pub failed: Vec<(PaneAddress, String)>,
}

impl SendSummary {
    pub fn total(&self) -> usize {
        self.sent.len() + self.failed.len()
    }

    /// `Broadcast to n/m session(s)`
    pub fn summary_line(&self) -> String {
        format!("Broadcast to {}/{} session(s)", self.sent.len(), self.total())
    }
}

/// Type `keys` into every target without pressing Enter, at most
/// `max_parallel` at a time. Results keep the targets' order.
pub async fn send_to_sessions(
    runner: &dyn CommandRunner,
    targets: &[RegisteredSession],
    keys: &str,
    max_parallel: usize,
) -> SendSummary {
    let permits = Arc::new(Semaphore::new(max_parallel.max(1)));
    let sends = targets.iter().map(|s| {
        let permits = Arc::clone(&permits);
        async move {
            let addr = s.address();
            let result = match permits.acquire().await {
                Ok(_permit) => send_keys(runner, &addr.to_string(), keys, false).await,
                Err(e) => Err(DotkitError::Other(e.into())),
            };
            (addr, result)
        }
    });

    let mut summary = SendSummary::default();
    for (addr, result) in futures::future::join_all(sends).await {
        match result {
            Ok(()) => summary.sent.push(addr),
            Err(e) => {
                warn!(pane = %addr, error = %e, "send-keys failed");
                summary.failed.push((addr, e.to_string()));
            }
        }
    }
    summary
}
