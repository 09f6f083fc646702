// GET /conversation/{conversationId} handler

use std::convert::Infallible;

use tracing::debug;
use warp::http::StatusCode;

use crate::conversation::ConversationService;
use crate::models::ConversationResponse;

pub async fn get_conversation_handler(
    conversation_id: String,
    service: ConversationService,
) -> Result<impl warp::Reply, Infallible> {
    debug!(conversation_id = %conversation_id, "GET /conversation");

    let history = service.store().get(&conversation_id).await;
    let response = ConversationResponse {
        conversation_id,
        history,
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&response),
        StatusCode::OK,
    ))
}
