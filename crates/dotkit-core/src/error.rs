use thiserror::Error;

/// Unified error type for every dotkit crate.
#[derive(Error, Debug)]
pub enum DotkitError {
    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    #[error("config validation failed: {field}: {reason}")]
    ConfigValidation { field: String, reason: String },

    // ── Subprocess errors ──────────────────────────────────────
    #[error("failed to run {program}: {reason}")]
    Command { program: String, reason: String },

    #[error("{program} timed out after {secs}s")]
    CommandTimeout { program: String, secs: u64 },

    #[error("{program} exited with {}: {stderr}", code.map(|c| c.to_string()).unwrap_or_else(|| "signal".into()))]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    // ── HTTP errors ────────────────────────────────────────────
    #[error("http error: {service}: {reason}")]
    Http { service: String, reason: String },

    // ── Domain errors ──────────────────────────────────────────
    #[error("hook error: {0}")]
    Hook(String),

    #[error("playlist error: {0}")]
    Playlist(String),

    #[error("llm response rejected: {0}")]
    LlmResponse(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("cancelled: {0}")]
    Cancelled(String),

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl DotkitError {
    /// Shorthand for an [`DotkitError::Http`] error.
    pub fn http(service: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Http {
            service: service.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DotkitError>;
