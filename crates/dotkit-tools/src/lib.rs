//! # dotkit-tools
//!
//! One-shot helpers that don't belong to a bigger subsystem: the shell
//! command linter hook, ChatGPT export conversion, Killercoda scenario
//! steps, Perplexity search and the YouTube channel catalog.

pub mod chatgpt;
pub mod killercoda;
pub mod lint;
pub mod search;
pub mod youtube;

pub use killercoda::{Step, add_step};
pub use lint::{LintOutcome, lint_hook_payload, validate_command};
pub use youtube::{Catalog, parse_iso8601_duration};
