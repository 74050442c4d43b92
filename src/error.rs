//! Error types
//!
//! A single error enum for the library. The binary wraps these in `anyhow`
//! with extra context before reporting them.

use thiserror::Error;

/// Unified error type for tanf
#[derive(Error, Debug)]
pub enum AnfError {
    // =========================================================================
    // Startup Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Missing required configuration element: {0}")]
    MissingConfiguration(String),

    // =========================================================================
    // Remote API Errors
    // =========================================================================
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("API request failed: {status} {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Long-running operation {status}: {message}")]
    OperationFailed { status: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    // =========================================================================
    // Resource Identity Errors
    // =========================================================================
    #[error("Invalid resource id: {0}")]
    InvalidResourceId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnfError {
    /// True when the remote service reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, AnfError::NotFound(_) | AnfError::Api { status: 404, .. })
    }
}

pub type Result<T> = std::result::Result<T, AnfError>;
