//! Error types for the query crate.

use thiserror::Error;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised while compiling a path-query expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The expression contains an unexpected character or token.
    #[error("syntax error at position {position}: {message}")]
    Syntax {
        /// Byte offset into the expression.
        position: usize,
        /// Description of the problem.
        message: String,
    },

    /// The expression ended while more input was required.
    #[error("unexpected end of expression: expected {expected}")]
    UnexpectedEnd {
        /// What the parser was looking for.
        expected: String,
    },
}

impl QueryError {
    /// Creates a syntax error.
    pub fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }

    /// Creates an unexpected end error.
    pub fn unexpected_end(expected: impl Into<String>) -> Self {
        Self::UnexpectedEnd {
            expected: expected.into(),
        }
    }
}
