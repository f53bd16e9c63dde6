//! # dotkit-tmux
//!
//! Sends text to Claude sessions running in tmux panes.
//!
//! Two ways of finding the panes:
//! - [`broadcast`] discovers them live from `tmux list-panes`, either by
//!   agent name or by the monitor wrapper process, and submits the message.
//! - [`registry`] reads the registration files each session writes at
//!   startup and types the keys without pressing Enter.

pub mod broadcast;
pub mod pane;
pub mod registry;

pub use broadcast::{BroadcastMode, BroadcastReport, broadcast};
pub use pane::{PaneAddress, current_pane, send_keys};
pub use registry::{RegisteredSession, SendSummary, load_sessions, select_targets, send_to_sessions};
