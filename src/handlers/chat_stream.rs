// POST /chat/stream handler

use std::convert::Infallible;

use async_stream::stream;
use futures_util::stream::{Stream, StreamExt};
use tracing::info;
use warp::sse::Event;
use warp::Reply;

use crate::conversation::{ConversationService, TurnStream};
use crate::error::ApiError;
use crate::models::ChatRequest;
use crate::sse::{
    create_complete_event, create_connected_event, create_error_event, create_stream_event,
};

pub async fn chat_stream_handler(
    request: ChatRequest,
    service: ConversationService,
) -> Result<warp::reply::Response, Infallible> {
    let Some(message) = request.message_text() else {
        return Ok(
            ApiError::BadRequest("Missing required field: message".to_string())
                .into_reply()
                .into_response(),
        );
    };
    let conversation_id = request.conversation_id_or_new();
    info!(conversation_id = %conversation_id, "POST /chat/stream");

    let turn = match service
        .turn(&conversation_id, message, request.system_prompt.clone())
        .await
    {
        Ok(turn) => turn,
        Err(e) => return Ok(ApiError::from(e).into_reply().into_response()),
    };

    let event_stream = create_event_stream(conversation_id, turn);

    Ok(warp::sse::reply(warp::sse::keep_alive().stream(event_stream)).into_response())
}

/// `connected`, the relayed turn events, then `complete` (or a terminal `error`)
fn create_event_stream(
    conversation_id: String,
    mut turn: TurnStream,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + Sync {
    stream! {
        yield create_connected_event(&conversation_id);

        while let Some(item) = turn.next().await {
            match item {
                Ok(event) => yield create_stream_event(&event),
                Err(e) => {
                    yield create_error_event(&e.to_string());
                    return;
                }
            }
        }

        yield create_complete_event();
    }
}
