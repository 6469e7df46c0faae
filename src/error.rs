//! Context prefetch error types

use thiserror::Error;

/// Context prefetch error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid glob pattern
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// Cache manifest error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Physical load of a single resource failed
    #[error("Failed to load {path}: {message}")]
    Load { path: String, message: String },

    /// Session provider error
    #[error("Session error: {0}")]
    Session(String),

    /// Key-value storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build a load error for `path`
    pub fn load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for context prefetch operations
pub type Result<T> = std::result::Result<T, Error>;
