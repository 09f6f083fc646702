//! Error types for the upstream LLM layer

use thiserror::Error;

/// Errors that can occur while talking to the model API
#[derive(Debug, Error)]
pub enum LlmError {
    /// Non-success HTTP status, or a transport failure before any status
    /// was received (status 0)
    #[error("Claude API error {status}: {body}")]
    HttpError { status: u16, body: String },

    /// Failure while reading the streamed response body
    #[error("Stream error: {0}")]
    StreamError(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::HttpError {
            status: err.status().map(|s| s.as_u16()).unwrap_or(0),
            body: err.to_string(),
        }
    }
}
