//! # dotkit-desktop
//!
//! Hotkey-triggered desktop macros. [`Desktop`] wraps `xclip`, `xdotool`,
//! `zenity` and `xdg-open`; the [`macros`] module builds on it.

pub mod desktop;
pub mod keys;
pub mod macros;

pub use desktop::Desktop;
pub use keys::{KeyStep, parse_key_sequence};
pub use macros::{ConkyState, MusicDownload, NewTask, Template};
