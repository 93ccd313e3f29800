//! Error types for plugin metadata lookups.

use thiserror::Error;

/// Errors that can occur while resolving app plugin metadata.
#[derive(Debug, Error)]
pub enum MetaError {
    /// The lookup itself failed
    #[error("Lookup failed: {0}")]
    LookupFailed(String),

    /// Meta source could not provide plugin metas
    #[error("Meta source failed: {0}")]
    SourceFailed(String),

    /// Plugin identifier is empty
    #[error("Invalid plugin id: {0:?}")]
    InvalidPluginId(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed metas document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Registry lock poisoned
    #[error("Lock poisoned")]
    LockPoisoned,
}

impl MetaError {
    /// Shorthand for a lookup failure carrying a plain message.
    pub fn lookup(message: impl Into<String>) -> Self {
        MetaError::LookupFailed(message.into())
    }
}

/// Result type for plugin metadata operations
pub type Result<T> = std::result::Result<T, MetaError>;
