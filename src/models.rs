// Request and response bodies of the HTTP surface

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::llm::TurnMetadata;
use crate::transcript::Message;

// Request Types
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ChatRequest {
    pub message: Option<String>,
    #[serde(default, alias = "conversationId")]
    pub conversation_id: Option<String>,
    #[serde(default, alias = "systemPrompt")]
    pub system_prompt: Option<String>,
}

impl ChatRequest {
    /// Caller's conversation id, or a fresh random one
    pub fn conversation_id_or_new(&self) -> String {
        self.conversation_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }

    /// The message text, if present and not blank
    pub fn message_text(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }
}

// Aggregated chat response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub conversation_id: String,
    pub response: String,
    pub thinking: Option<String>,
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub model: String,
    /// Seconds until the first content delta
    pub ttft: Option<f64>,
    /// Seconds for the whole turn
    pub total_time: Option<f64>,
    pub thinking_enabled: bool,
    pub streaming_used: bool,
}

impl ResponseMetadata {
    pub fn new(model: impl Into<String>, timing: Option<TurnMetadata>) -> Self {
        Self {
            model: model.into(),
            ttft: timing.map(|t| t.time_to_first_token.as_secs_f64()),
            total_time: timing.map(|t| t.total_time.as_secs_f64()),
            thinking_enabled: true,
            streaming_used: true,
        }
    }
}

// Conversation history response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub conversation_id: String,
    pub history: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub features: HealthFeatures,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthFeatures {
    pub thinking: bool,
    pub streaming: bool,
    pub memory: bool,
    pub sse: bool,
}

impl HealthResponse {
    pub fn healthy(model: impl Into<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            model: model.into(),
            features: HealthFeatures {
                thinking: true,
                streaming: true,
                memory: true,
                sse: true,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
