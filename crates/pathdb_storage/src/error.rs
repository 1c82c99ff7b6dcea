//! Error types for backing operations.

use std::io;
use thiserror::Error;

/// Result type for backing operations.
pub type BackingResult<T> = Result<T, BackingError>;

/// Errors that can occur while reading or writing a backing.
#[derive(Debug, Error)]
pub enum BackingError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stored content could not be parsed or the tree could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Nothing has been stored at the location yet.
    #[error("no stored document at {location}")]
    NotFound {
        /// File path or storage key that was looked up.
        location: String,
    },

    /// The stored JSON is valid but is not a document tree.
    #[error("invalid document: {message}")]
    InvalidDocument {
        /// Description of what was found instead.
        message: String,
    },
}

impl BackingError {
    /// Creates a not-found error.
    pub fn not_found(location: impl Into<String>) -> Self {
        Self::NotFound {
            location: location.into(),
        }
    }

    /// Creates an invalid document error.
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            message: message.into(),
        }
    }

    /// Returns true if the error means the store has never been written.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
