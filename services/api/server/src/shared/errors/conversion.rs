use axum::extract::rejection::PathRejection;

use super::base::{ApiError, codes};

impl From<PathRejection> for ApiError {
    fn from(error: PathRejection) -> Self {
        ApiError::new(
            axum::http::StatusCode::BAD_REQUEST,
            codes::INVALID_PATH,
            "Invalid path parameter",
        )
        .with_detail(Some("id".to_string()), codes::INVALID_PATH, error.body_text())
    }
}
