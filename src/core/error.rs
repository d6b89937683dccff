//! Error types and error handling for the Tessera index registry.
//!
//! This module defines the error types used throughout the
//! crate. Adapters (the CLI) decide how errors are presented.

use thiserror::Error;

/// Result type alias for Tessera operations
pub type Result<T> = std::result::Result<T, TesseraError>;

/// Main error type for Tessera
#[derive(Error, Debug)]
pub enum TesseraError {
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    #[error("Index already exists: {0}")]
    IndexAlreadyExists(String),

    #[error("Invalid index: {0}")]
    InvalidIndex(String),

    #[error("Invalid analysis configuration: {0}")]
    InvalidAnalysis(String),

    /// Wraps an underlying failure hit while restoring or mutating
    /// an index (e.g. stored analysis that no longer builds).
    #[error("Runtime exception: {message}: {source}")]
    RuntimeException {
        message: String,
        #[source]
        source: Box<TesseraError>,
    },

    #[error("Metadata error: {0}")]
    MetadataError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl TesseraError {
    /// Wrap `source` in a runtime exception with a short description
    pub fn runtime(message: impl Into<String>, source: TesseraError) -> Self {
        TesseraError::RuntimeException {
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Check if this is a "not found" type error
    pub fn is_not_found(&self) -> bool {
        matches!(self, TesseraError::IndexNotFound(_))
    }

    /// Check if this is a conflict error (already exists)
    pub fn is_conflict(&self) -> bool {
        matches!(self, TesseraError::IndexAlreadyExists(_))
    }

    /// Check if this is a bad request error (invalid input)
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            TesseraError::InvalidIndex(_)
                | TesseraError::InvalidAnalysis(_)
                | TesseraError::ConfigError(_)
        )
    }
}
