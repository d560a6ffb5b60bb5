//! Error types for the glow_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for glow_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rejected input (negative counts, blank ids, malformed date keys).
    /// Always raised before the store is touched.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A record or catalog entry that was required to exist is missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Store returned data it could not vouch for
    #[error("Storage error: {0}")]
    Storage(String),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for failures that originate in the persistence layer.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::Json(_) | Error::Csv(_) | Error::Storage(_)
        )
    }
}
