// GET /health handler

use std::convert::Infallible;

use crate::conversation::ConversationService;
use crate::models::HealthResponse;

pub async fn health_handler(service: ConversationService) -> Result<impl warp::Reply, Infallible> {
    Ok(warp::reply::json(&HealthResponse::healthy(
        service.config().model.clone(),
    )))
}
