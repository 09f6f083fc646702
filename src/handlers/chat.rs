// POST /chat handler

use std::convert::Infallible;

use tracing::info;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};

use crate::conversation::ConversationService;
use crate::error::ApiError;
use crate::models::{ChatRequest, ChatResponse, ResponseMetadata};

/// Run the whole turn and answer with one JSON document
pub async fn chat_handler(
    request: ChatRequest,
    service: ConversationService,
) -> Result<WithStatus<Json>, Infallible> {
    let Some(message) = request.message_text() else {
        return Ok(ApiError::BadRequest("Missing required field: message".to_string()).into_reply());
    };
    let conversation_id = request.conversation_id_or_new();
    info!(conversation_id = %conversation_id, "POST /chat");

    let buffer = match service
        .complete_turn(&conversation_id, message, request.system_prompt.clone())
        .await
    {
        Ok(buffer) => buffer,
        Err(e) => return Ok(ApiError::from(e).into_reply()),
    };

    let thinking = (!buffer.thinking().is_empty()).then(|| buffer.thinking().to_string());
    let response = ChatResponse {
        conversation_id,
        response: buffer.text().to_string(),
        thinking,
        metadata: ResponseMetadata::new(service.config().model.clone(), buffer.metadata()),
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&response),
        StatusCode::OK,
    ))
}
