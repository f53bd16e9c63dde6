//! # dotkit-config
//!
//! Configuration for the dotkit tools. Reads from `dotkit.toml`, then
//! environment variables, then CLI overrides, in that precedence order.

pub mod loader;
pub mod schema;

pub use loader::{ConfigLoader, envrc_value};
pub use schema::DotkitConfig;
pub use schema::{
    ConfigWarning, LaunchAction, LauncherRule, ServiceEntry, ServiceKind, ServicesConfig, Units,
    WarningSeverity,
};
