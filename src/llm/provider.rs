//! Provider trait for the upstream model API

use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;

use super::claude::types::{ClaudeStreamEvent, MessagesRequest};
use super::error::LlmError;

/// Parsed upstream payloads in arrival order
pub type ClaudeEventStream = Pin<Box<dyn Stream<Item = Result<ClaudeStreamEvent, LlmError>> + Send>>;

/// Interface the conversation service drives for each turn
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a streaming request to the model API
    ///
    /// Resolves once the response status is known. A non-success status is
    /// returned as `LlmError::HttpError` carrying the raw error body; nothing
    /// has been streamed in that case.
    async fn stream_messages(&self, request: MessagesRequest) -> Result<ClaudeEventStream, LlmError>;
}
