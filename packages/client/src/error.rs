//! Client error definitions.

use thiserror::Error;

use studyhall_server::domain::ValueObjectError;

/// Errors surfaced by the chat ports and adapters
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// Missing or rejected access token
    #[error("Unauthorized: {0}")]
    Authorization(String),

    /// Input rejected before or by the store
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Reading messages, rooms or profiles failed
    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    /// Inserting a message failed
    #[error("Write failed: {0}")]
    Write(String),

    /// Opening or releasing a realtime channel failed
    #[error("Subscription failed: {0}")]
    Subscription(String),

    /// The referenced room or profile does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<ValueObjectError> for ChatError {
    fn from(error: ValueObjectError) -> Self {
        ChatError::Validation(error.to_string())
    }
}
