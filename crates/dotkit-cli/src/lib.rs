//! # dotkit-cli
//!
//! Command-line interface for the dotkit tools.
//!
//! ## Commands
//!
//! - `dotkit playlist`: add, organize, sort, dedupe and normalize playlist entries
//! - `dotkit hook <name>`: Taskwarrior on-modify hooks
//! - `dotkit report`: Markdown time and task reports
//! - `dotkit widget`: Argos / waybar frames
//! - `dotkit snd`, `dotkit send-keys`: tmux broadcast
//! - `dotkit macro`: desktop hotkey macros
//! - `dotkit tool`: standalone helpers
//! - `dotkit config`, `dotkit doctor`, `dotkit init`: configuration

pub mod commands;

pub use commands::Cli;
