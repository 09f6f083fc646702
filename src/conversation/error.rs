use crate::llm::error::LlmError;

/// Errors that end a turn
#[derive(Debug, thiserror::Error)]
pub enum ConversationError {
    /// The request was rejected before any state changed
    #[error("{0}")]
    Validation(String),

    /// The model API refused the request or could not be reached
    #[error(transparent)]
    Upstream(#[from] LlmError),
}
