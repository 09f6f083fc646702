//! Mapping from stored history to Claude's request format

use crate::llm::config::GenerationConfig;
use crate::transcript::HistoryEntry;

use super::types::{ClaudeMessage, MessagesRequest, ThinkingConfig};

/// Build the streaming request for one turn.
///
/// `system` is the caller's prompt; the configured fallback is used when it
/// is absent or blank.
pub fn to_messages_request(
    history: Vec<HistoryEntry>,
    config: &GenerationConfig,
    system: Option<String>,
) -> MessagesRequest {
    MessagesRequest {
        model: config.model.clone(),
        messages: history.into_iter().map(to_claude_message).collect(),
        max_tokens: config.max_tokens,
        temperature: config.temperature,
        stream: true,
        thinking: ThinkingConfig::enabled(config.thinking_budget),
        system: config.resolve_system_prompt(system),
    }
}

fn to_claude_message(entry: HistoryEntry) -> ClaudeMessage {
    ClaudeMessage {
        role: entry.role.as_str().to_string(),
        content: entry.content,
    }
}
