//! Anthropic Messages API request and stream event types
//!
//! These types map directly to the `/v1/messages` streaming schema. Only the
//! fields the relay needs are modelled; everything else is ignored.

use serde::{Deserialize, Serialize};

/// Streaming request body for `POST /v1/messages`
#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest {
    /// Model identifier
    pub model: String,
    /// Conversation history, oldest first
    pub messages: Vec<ClaudeMessage>,
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Always true for the relay
    pub stream: bool,
    /// Extended thinking settings
    pub thinking: ThinkingConfig,
    /// System prompt (top-level field)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

/// A single message in the upstream conversation
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ClaudeMessage {
    /// Role: "user" or "assistant"
    pub role: String,
    pub content: String,
}

/// Extended thinking block of the request
#[derive(Debug, Clone, Serialize)]
pub struct ThinkingConfig {
    /// Always "enabled"
    #[serde(rename = "type")]
    pub thinking_type: String,
    pub budget_tokens: u32,
}

impl ThinkingConfig {
    pub fn enabled(budget_tokens: u32) -> Self {
        Self {
            thinking_type: "enabled".to_string(),
            budget_tokens,
        }
    }
}

/// SSE payloads from the streaming API
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClaudeStreamEvent {
    /// Content block delta (incremental update)
    ContentBlockDelta {
        #[serde(default)]
        index: usize,
        delta: ClaudeContentDelta,
    },
    /// Message streaming stopped
    MessageStop,
    /// Ping event (keep-alive)
    Ping,
    /// Error event
    Error { error: ClaudeErrorData },
    /// message_start, content_block_start/stop, message_delta and anything newer
    #[serde(other)]
    Other,
}

/// Content delta (incremental update)
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClaudeContentDelta {
    /// Answer text
    TextDelta { text: String },
    /// Thinking trace text
    ThinkingDelta { thinking: String },
    /// Signature, tool input and other deltas the relay does not forward
    #[serde(other)]
    Other,
}

/// Error data
#[derive(Debug, Clone, Deserialize)]
pub struct ClaudeErrorData {
    /// Error type
    #[serde(rename = "type")]
    pub error_type: String,
    /// Error message
    pub message: String,
}
