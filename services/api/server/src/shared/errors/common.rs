use super::base::{ApiError, codes};
use axum::http::StatusCode;

/// Common error constructors
pub fn internal_server_error(message: impl Into<String>) -> ApiError {
    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        codes::INTERNAL_SERVER_ERROR,
        message,
    )
}

pub fn bad_request(message: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message)
}

pub fn not_found(message: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message)
}

/// Store failure with a generic, client-safe message.
pub fn database_error(message: impl Into<String>) -> ApiError {
    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        codes::DATABASE_ERROR,
        message,
    )
}

pub fn validation_error(message: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, codes::VALIDATION_ERROR, message)
}
