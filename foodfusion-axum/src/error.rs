use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use foodfusion::{AuthError, BlockStatus, Error};
use serde_json::json;
use thiserror::Error;

pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{}", .0.message.as_deref().unwrap_or("Too many failed login attempts"))]
    RateLimited(BlockStatus),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Auth(AuthError::RateLimited(status)) => ApiError::RateLimited(status),
            Error::Auth(AuthError::UserAlreadyExists) => {
                ApiError::Conflict(AuthError::UserAlreadyExists.to_string())
            }
            Error::Auth(AuthError::UserNotFound) => {
                ApiError::NotFound(AuthError::UserNotFound.to_string())
            }
            Error::Auth(AuthError::Unauthorized) => {
                ApiError::Unauthorized("Unauthorized access".to_string())
            }
            Error::Auth(AuthError::Forbidden(message)) => ApiError::Forbidden(message),
            Error::Auth(e) => ApiError::Unauthorized(e.to_string()),
            Error::Validation(e) => ApiError::BadRequest(e.to_string()),
            Error::Session(_) => ApiError::Unauthorized("Invalid or expired token".to_string()),
            Error::Storage(e) => ApiError::InternalError(e.to_string()),
            Error::Crypto(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "Rejected request body");
        ApiError::BadRequest("Invalid JSON data".to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(error = %rejection, "Rejected query string");
        ApiError::BadRequest("Invalid query parameters".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::RateLimited(status) => {
                let message = status
                    .message
                    .clone()
                    .unwrap_or_else(|| "Too many failed login attempts".to_string());
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    json!({
                        "success": false,
                        "message": message,
                        "data": {
                            "blocked": status.blocked,
                            "remaining_seconds": status.remaining_seconds,
                            "blocked_until": status.blocked_until,
                            "message": message,
                        }
                    }),
                )
            }
            ApiError::InternalError(detail) => {
                tracing::error!(error = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "success": false, "message": GENERIC_ERROR_MESSAGE }),
                )
            }
            other => {
                let status = match other {
                    ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                    ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
                    ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
                    ApiError::NotFound(_) => StatusCode::NOT_FOUND,
                    ApiError::Conflict(_) => StatusCode::CONFLICT,
                    ApiError::RateLimited(_) | ApiError::InternalError(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, json!({ "success": false, "message": other.to_string() }))
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
