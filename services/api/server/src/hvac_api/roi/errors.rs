use uuid::Uuid;

use crate::gateway::GatewayError;
use crate::hvac_api::error_recorder::IntoApiError;
use crate::shared::errors::{ApiError, database_error};

pub type HandlerResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to fetch maintenance logs: {0}")]
    Fetch(#[source] GatewayError),
}

impl IntoApiError for Error {
    fn into_api_error(self, request_id: &Uuid) -> ApiError {
        tracing::error!(error = %self, request_id = %request_id, "ROI computation failed");
        match self {
            Error::Fetch(_) => database_error("Failed to fetch maintenance logs")
                .with_trace_id(request_id.to_string()),
        }
    }
}
