//! # dotkit-widgets
//!
//! Status-bar widgets. Each run fetches what it needs, prints one frame in
//! Argos (plain text) or waybar (JSON) format, and exits.

pub mod argos;
pub mod claude;
pub mod debounce;
pub mod status;
pub mod waybar;
pub mod weather;

pub use argos::{ArgosItem, ArgosMenu};
pub use debounce::DebounceState;
pub use dotkit_core::{Fetcher, HttpFetcher};
pub use status::{ServiceReport, ServiceStatus, check_all, overall};
pub use waybar::WaybarOutput;

/// Which status bar the output is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Argos,
    Waybar,
}

impl std::str::FromStr for OutputFormat {
    type Err = dotkit_core::DotkitError;

    fn from_str(s: &str) -> dotkit_core::Result<Self> {
        match s {
            "argos" => Ok(OutputFormat::Argos),
            "waybar" => Ok(OutputFormat::Waybar),
            other => Err(dotkit_core::DotkitError::InvalidInput(format!(
                "unknown output format '{other}' (expected argos or waybar)"
            ))),
        }
    }
}
