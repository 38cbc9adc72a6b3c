//! Error types for Fact Guard

use thiserror::Error;

/// Main error type for Fact Guard operations
#[derive(Error, Debug)]
pub enum FactGuardError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upstream analysis service errors
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// HTTP server errors (bind, serve)
    #[error("Server error: {0}")]
    Server(String),

    /// Article catalog errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl From<serde_json::Error> for FactGuardError {
    fn from(e: serde_json::Error) -> Self {
        FactGuardError::Serialization(e.to_string())
    }
}

/// Result type alias for Fact Guard operations
pub type Result<T> = std::result::Result<T, FactGuardError>;
