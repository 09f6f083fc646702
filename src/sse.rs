use std::convert::Infallible;

use warp::sse::Event;

use crate::llm::StreamEvent;

/// Every payload is sent under this SSE event name; the JSON `type` field
/// tells them apart
const EVENT_NAME: &str = "message";

fn message_event(payload: serde_json::Value) -> Result<Event, Infallible> {
    Ok(Event::default().event(EVENT_NAME).data(payload.to_string()))
}

/// Create the `connected` SSE event that opens every stream
pub fn create_connected_event(conversation_id: &str) -> Result<Event, Infallible> {
    message_event(serde_json::json!({
        "type": "connected",
        "conversation_id": conversation_id
    }))
}

/// Create the SSE event for one relayed turn event
pub fn create_stream_event(event: &StreamEvent) -> Result<Event, Infallible> {
    message_event(stream_event_payload(event))
}

/// Create the terminal error SSE event
pub fn create_error_event(message: &str) -> Result<Event, Infallible> {
    message_event(serde_json::json!({
        "type": "error",
        "error": message
    }))
}

/// Create a complete SSE event to signal stream completion
pub fn create_complete_event() -> Result<Event, Infallible> {
    message_event(serde_json::json!({ "type": "complete" }))
}

fn stream_event_payload(event: &StreamEvent) -> serde_json::Value {
    match event {
        StreamEvent::Thinking(content) => serde_json::json!({
            "type": "thinking",
            "content": content
        }),
        StreamEvent::Text(content) => serde_json::json!({
            "type": "text",
            "content": content
        }),
        StreamEvent::Metadata(metadata) => serde_json::json!({
            "type": "metadata",
            "ttft": metadata.time_to_first_token.as_secs_f64(),
            "total_time": metadata.total_time.as_secs_f64()
        }),
    }
}
