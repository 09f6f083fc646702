// HTTP error mapping

use std::convert::Infallible;

use thiserror::Error;
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};

use crate::conversation::ConversationError;
use crate::models::ErrorResponse;

/// Failures reported to HTTP callers as `{"error": "..."}`
#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller sent an unusable request (400)
    #[error("{0}")]
    BadRequest(String),

    /// The turn failed after it was accepted (500)
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_reply(self) -> WithStatus<Json> {
        let status = self.status();
        json_error(self.to_string(), status)
    }
}

impl From<ConversationError> for ApiError {
    fn from(err: ConversationError) -> Self {
        match err {
            ConversationError::Validation(message) => ApiError::BadRequest(message),
            ConversationError::Upstream(e) => {
                error!(error = %e, "Chat request failed");
                ApiError::Internal(e.to_string())
            }
        }
    }
}

pub fn json_error(message: impl Into<String>, status: StatusCode) -> WithStatus<Json> {
    warp::reply::with_status(
        warp::reply::json(&ErrorResponse {
            error: message.into(),
        }),
        status,
    )
}

/// Turn warp rejections into JSON errors
pub async fn handle_rejection(rejection: warp::Rejection) -> Result<WithStatus<Json>, Infallible> {
    if rejection.is_not_found() {
        return Ok(json_error("Not found", StatusCode::NOT_FOUND));
    }

    if let Some(e) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        return Ok(json_error(
            format!("Invalid JSON body: {}", e),
            StatusCode::BAD_REQUEST,
        ));
    }

    if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        return Ok(json_error("Request body too large", StatusCode::PAYLOAD_TOO_LARGE));
    }

    if rejection.find::<warp::reject::UnsupportedMediaType>().is_some() {
        return Ok(json_error(
            "Content-Type must be application/json",
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
        ));
    }

    if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(json_error("Method not allowed", StatusCode::METHOD_NOT_ALLOWED));
    }

    warn!(rejection = ?rejection, "Unhandled rejection");
    Ok(json_error(
        "Internal server error",
        StatusCode::INTERNAL_SERVER_ERROR,
    ))
}
