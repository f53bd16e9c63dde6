use std::fmt;
use std::str::FromStr;

use tracing::debug;

use dotkit_core::{CommandRunner, CommandSpec, DotkitError, Result, run_checked};

/// `session:window.pane`, the form `tmux -t` accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaneAddress {
    pub session: String,
    pub window: String,
    pub pane: String,
}

impl PaneAddress {
    pub fn new(session: impl Into<String>, window: impl Into<String>, pane: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            window: window.into(),
            pane: pane.into(),
        }
    }
}

impl fmt::Display for PaneAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}.{}", self.session, self.window, self.pane)
    }
}

impl FromStr for PaneAddress {
    type Err = DotkitError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || DotkitError::InvalidInput(format!("expected session:window.pane, got '{s}'"));
        // Session names may contain ':'; the window/pane part never does.
        let (session, rest) = s.rsplit_once(':').ok_or_else(invalid)?;
        let (window, pane) = rest.split_once('.').ok_or_else(invalid)?;
        if session.is_empty() || window.is_empty() || pane.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(session, window, pane))
    }
}

/// `tmux list-panes -a` with `format` and split each line into the pane
/// target and the remainder.
pub(crate) async fn list_panes(runner: &dyn CommandRunner, format: &str) -> Result<Vec<(String, String)>> {
    let spec = CommandSpec::new("tmux").args(["list-panes", "-a", "-F", format]);
    let stdout = run_checked(runner, &spec).await?;
    Ok(stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|line| match line.split_once(' ') {
            Some((target, rest)) => (target.to_string(), rest.trim().to_string()),
            None => (line.trim().to_string(), String::new()),
        })
        .collect())
}

/// Type `keys` into a pane. With `enter` the line is submitted afterwards
/// as a separate `C-m`.
pub async fn send_keys(runner: &dyn CommandRunner, target: &str, keys: &str, enter: bool) -> Result<()> {
    run_checked(
        runner,
        &CommandSpec::new("tmux").args(["send-keys", "-t", target, keys]),
    )
    .await?;
    if enter {
        run_checked(
            runner,
            &CommandSpec::new("tmux").args(["send-keys", "-t", target, "C-m"]),
        )
        .await?;
    }
    Ok(())
}

/// The pane this process runs in, when inside tmux.
pub async fn current_pane(runner: &dyn CommandRunner, inside_tmux: bool) -> Option<PaneAddress> {
    if !inside_tmux {
        return None;
    }
    let spec = CommandSpec::new("tmux").args([
        "display-message",
        "-p",
        "#{session_name}:#{window_index}.#{pane_index}",
    ]);
    match run_checked(runner, &spec).await {
        Ok(out) => out.trim().parse().ok(),
        Err(e) => {
            debug!(error = %e, "cannot determine current pane");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        let addr: PaneAddress = "main:1.3".parse().unwrap();
        assert_eq!(addr, PaneAddress::new("main", "1", "3"));
        assert_eq!(addr.to_string(), "main:1.3");

        let addr: PaneAddress = "a:b:2.0".parse().unwrap();
        assert_eq!(addr.session, "a:b");

        assert!("main".parse::<PaneAddress>().is_err());
        assert!("main:1".parse::<PaneAddress>().is_err());
        assert!(":1.2".parse::<PaneAddress>().is_err());
    }
}
