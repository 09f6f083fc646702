// Route definitions

use warp::Filter;

use crate::conversation::ConversationService;
use crate::error::handle_rejection;
use crate::handlers;

/// Largest accepted request body
const MAX_BODY_BYTES: u64 = 1024 * 1024;

/// All routes, with rejections turned into JSON errors and CORS headers on
/// every response
pub fn configure_routes(
    service: ConversationService,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let with_service = warp::any().map(move || service.clone());
    let json_body = warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json());

    // POST /chat
    let chat = warp::path("chat")
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body.clone())
        .and(with_service.clone())
        .and_then(handlers::chat_handler);

    // POST /chat/stream
    let chat_stream = warp::path("chat")
        .and(warp::path("stream"))
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body)
        .and(with_service.clone())
        .and_then(handlers::chat_stream_handler);

    // GET /conversation/{conversationId}
    let get_conversation = warp::path("conversation")
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_service.clone())
        .and_then(handlers::get_conversation_handler);

    // GET /health
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_service)
        .and_then(handlers::health_handler);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_headers(vec!["Content-Type", "Authorization", "Accept", "Cache-Control"])
        .max_age(86400);

    // Combine routes
    chat.or(chat_stream)
        .or(get_conversation)
        .or(health)
        .recover(handle_rejection)
        .with(cors)
}
