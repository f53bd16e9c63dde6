//! # dotkit-taskwarrior
//!
//! Taskwarrior on-modify hooks and the Markdown reports built from
//! `task` and `timew` output.
//!
//! A hook receives the task before and after the modification and must
//! print the (possibly adjusted) "after" task. The hooks here are pure:
//! side effects such as opening a URL are returned as [`HookAction`]s and
//! executed by the caller after the task JSON has been printed.

pub mod automations;
pub mod hook;
pub mod hooks;
pub mod report;
pub mod task;

pub use automations::render_automations;
pub use hook::{HookAction, HookInput, HookKind, HookOutcome, execute_actions, run_hook};
pub use task::Task;
