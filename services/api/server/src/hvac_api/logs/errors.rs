use uuid::Uuid;

use crate::gateway::GatewayError;
use crate::hvac_api::error_recorder::IntoApiError;
use crate::shared::errors::{ApiError, codes, database_error, not_found};

pub type HandlerResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to fetch logs: {0}")]
    Fetch(#[source] GatewayError),

    #[error("failed to create building: {0}")]
    Building(#[source] GatewayError),

    #[error("failed to create log: {0}")]
    Create(#[source] GatewayError),

    #[error("maintenance log {0} not found")]
    NotFound(i64),

    #[error("failed to update log: {0}")]
    Update(#[source] GatewayError),

    #[error("failed to delete log: {0}")]
    Delete(#[source] GatewayError),
}

impl Error {
    pub fn from_create(e: GatewayError) -> Self {
        match e {
            GatewayError::Building(_) => Error::Building(e),
            other => Error::Create(other),
        }
    }

    pub fn from_update(e: GatewayError) -> Self {
        match e {
            GatewayError::NotFound(id) => Error::NotFound(id),
            other => Error::Update(other),
        }
    }

    /// Label used for the `request_errors` metric.
    pub fn metric_code(&self) -> &'static str {
        match self {
            Error::Building(_) => "building_error",
            Error::NotFound(_) => "not_found",
            _ => "database_error",
        }
    }

    fn client_message(&self) -> &'static str {
        match self {
            Error::Fetch(_) => "Failed to fetch logs",
            Error::Building(_) => "Failed to create building",
            Error::Create(_) => "Failed to create log",
            Error::NotFound(_) => "Log not found",
            Error::Update(_) => "Failed to update log",
            Error::Delete(_) => "Failed to delete log",
        }
    }
}

impl IntoApiError for Error {
    fn into_api_error(self, request_id: &Uuid) -> ApiError {
        let message = self.client_message();
        let api_error = match self {
            Error::NotFound(id) => {
                tracing::info!(log_id = id, request_id = %request_id, "Maintenance log not found");
                not_found(message).with_detail(
                    Some("id".to_string()),
                    codes::LOG_NOT_FOUND,
                    format!("No maintenance log with id {id}"),
                )
            }
            other => {
                tracing::error!(error = %other, request_id = %request_id, "{message}");
                database_error(message)
            }
        };

        api_error.with_trace_id(request_id.to_string())
    }
}
