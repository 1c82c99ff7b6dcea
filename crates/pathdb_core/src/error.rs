//! Error types for pathdb core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in pathdb core operations.
///
/// Malformed query expressions are not represented here: they are recovered
/// inside the engine and surface through [`crate::Database::last_error`].
#[derive(Debug, Error)]
pub enum CoreError {
    /// The backing failed to persist the tree.
    #[error("storage error: {0}")]
    Storage(#[from] pathdb_storage::BackingError),

    /// The caller broke an operation's contract.
    #[error("invalid input to {operation}: {message}")]
    InvalidInput {
        /// Operation that rejected its input.
        operation: &'static str,
        /// Description of what was wrong.
        message: String,
    },

    /// A record could not be converted to or from a typed value.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Creates an invalid input error.
    pub fn invalid_input(operation: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            operation,
            message: message.into(),
        }
    }

    /// Returns true if the error is a caller contract violation.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_message() {
        let err = CoreError::invalid_input("replace", "record has no id field");
        assert_eq!(
            err.to_string(),
            "invalid input to replace: record has no id field"
        );
        assert!(err.is_invalid_input());
    }

    #[test]
    fn storage_error_converts() {
        let err: CoreError = pathdb_storage::BackingError::not_found("db.json").into();
        assert!(matches!(err, CoreError::Storage(_)));
        assert!(!err.is_invalid_input());
    }
}
