//! Error types for Ageni

use thiserror::Error;

/// Main error type for Ageni operations
#[derive(Error, Debug)]
pub enum AgeniError {
    /// API key, vector store host or port is missing
    #[error("Configuration not complete.")]
    ConfigIncomplete,

    /// Configuration loading/saving errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected input (bad config value, invalid port, empty context, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Embedding request failed or returned nothing usable
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Text generation request failed
    #[error("Generation error: {0}")]
    Generation(String),

    /// Vector store request failed
    #[error("Vector store error: {0}")]
    VectorStore(String),

    /// The per-context collection could not be created
    #[error("Failed to create collection: {0}")]
    CollectionCreate(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AgeniError {
    fn from(e: serde_json::Error) -> Self {
        AgeniError::Serialization(e.to_string())
    }
}

/// Result type alias for Ageni operations
pub type Result<T> = std::result::Result<T, AgeniError>;
