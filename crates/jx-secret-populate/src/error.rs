//! Error types for jx-secret-populate

use thiserror::Error;

/// Result type for populate operations
pub type Result<T> = std::result::Result<T, PopulateError>;

/// Errors that can occur while populating a secret store
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PopulateError {
    /// Invalid store key
    #[error("invalid secret store key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// Stored document could not be read or written
    #[error("serialization error for key '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Backend failure
    #[error("secret store error: {0}")]
    Store(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
