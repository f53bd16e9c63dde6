//! # dotkit-core
//!
//! Shared vocabulary for the dotkit workspace: the error type, the
//! subprocess runner every tool shells out through, the HTTP [`Fetcher`]
//! seam, and small file helpers.

pub mod error;
pub mod fsutil;
pub mod http;
pub mod mock;
pub mod process;

pub use error::{DotkitError, Result};
pub use fsutil::{atomic_write, expand_home};
pub use http::{Fetcher, HttpFetcher};
pub use process::{CommandOutput, CommandRunner, CommandSpec, SystemRunner, run_checked};
