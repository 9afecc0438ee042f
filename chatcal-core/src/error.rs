//! Error types for the chatcal core.

use thiserror::Error;

/// Errors that can occur in chatcal operations.
///
/// Unrecognized chat input is deliberately *not* an error: the classifier
/// returns a value for it and callers render help text instead.
#[derive(Error, Debug)]
pub enum ChatCalError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("No event found with title '{0}'")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for chatcal operations.
pub type ChatCalResult<T> = Result<T, ChatCalError>;
