//! Pending Claude session notifications.
//!
//! A monitor script drops one `claude-notification-SESSION-WINDOW-PANE-TS`
//! file per session waiting for input; the widget counts and lists them.

use std::path::{Path, PathBuf};

use tracing::debug;

use dotkit_core::Result;

use crate::argos::{ArgosItem, ArgosMenu, footer};
use crate::waybar::WaybarOutput;

const PREFIX: &str = "claude-notification-";
const DEFAULT_TITLE: &str = "Claude notification";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub session: String,
    pub window: String,
    pub pane: String,
    pub timestamp: String,
    pub title: String,
    pub path: PathBuf,
}

impl Notification {
    /// Numeric timestamp used for ordering; non-numeric sorts first.
    pub fn sort_key(&self) -> u64 {
        self.timestamp.parse().unwrap_or(0)
    }
}

/// Split `claude-notification-SESSION-WINDOW-PANE-TS` from the right, so a
/// session name may itself contain `-`.
pub fn parse_file_name(name: &str) -> Option<(String, String, String, String)> {
    let rest = name.strip_prefix(PREFIX)?;
    let mut parts = rest.rsplitn(4, '-');
    let ts = parts.next()?;
    let pane = parts.next()?;
    let window = parts.next()?;
    let session = parts.next()?;
    Some((session.into(), window.into(), pane.into(), ts.into()))
}

/// Text after the last `:` of the file content.
pub fn title_of(content: &str) -> String {
    match content.trim().rsplit_once(':') {
        Some((_, title)) => title.trim().to_string(),
        None => DEFAULT_TITLE.to_string(),
    }
}

/// Everything the widget shows: how many marker files exist, and the ones
/// that could be parsed, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationScan {
    pub count: usize,
    pub notifications: Vec<Notification>,
}

/// Scan the notification directory. A missing directory means none pending.
pub fn scan(dir: &Path) -> Result<NotificationScan> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(NotificationScan::default()),
        Err(e) => return Err(e.into()),
    };

    let mut scan = NotificationScan::default();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with(PREFIX) || !entry.file_type()?.is_file() {
            continue;
        }
        scan.count += 1;

        let Some((session, window, pane, timestamp)) = parse_file_name(&name) else {
            debug!(file = %name, "unparseable notification file name");
            continue;
        };
        let path = entry.path();
        let title = match std::fs::read_to_string(&path) {
            Ok(content) => title_of(&content),
            Err(e) => {
                debug!(file = %name, error = %e, "cannot read notification");
                continue;
            }
        };
        scan.notifications.push(Notification {
            session,
            window,
            pane,
            timestamp,
            title,
            path,
        });
    }
    scan.notifications.sort_by_key(Notification::sort_key);
    Ok(scan)
}

fn bar_label(count: usize) -> String {
    match count {
        0 => "🟢🧠".into(),
        1 => "🔴🧠".into(),
        n => format!("🔴{n}🧠"),
    }
}

pub fn render_argos(scan: &NotificationScan, time: &str) -> String {
    let mut menu = ArgosMenu::new().text(bar_label(scan.count)).separator();

    if scan.count > 0 {
        menu.push(ArgosItem::new(format!("Claude Notifications ({})", scan.count)).size(14));
        menu.push_separator();
        for (i, n) in scan.notifications.iter().enumerate() {
            menu.push(ArgosItem::new(format!("{}. {}:{}", i + 1, n.session, n.window)).size(12));
            menu.push(ArgosItem::new(format!("   {}", n.title)).size(10).color("#666666"));
        }
        menu.push_separator();
        menu.push(
            ArgosItem::new("Use keybinding to cycle through sessions")
                .size(10)
                .color("#888888"),
        );
    } else {
        menu.push(
            ArgosItem::new("All Claude sessions up to date")
                .size(14)
                .color("#2ecc71"),
        );
    }

    menu.push_separator();
    menu.push(
        ArgosItem::new(format!("Last checked: {time}"))
            .size(9)
            .color("#999999"),
    );
    menu.render()
}

pub fn render_waybar(scan: &NotificationScan) -> WaybarOutput {
    if scan.count == 0 {
        return WaybarOutput::new(bar_label(0), "All Claude sessions up to date").with_class("normal");
    }
    let tooltip: Vec<String> = scan
        .notifications
        .iter()
        .map(|n| format!("{}:{} {}", n.session, n.window, n.title))
        .collect();
    WaybarOutput::new(bar_label(scan.count), tooltip.join("\n")).with_class("warning")
}
