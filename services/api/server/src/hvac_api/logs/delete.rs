use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::AppState;
use crate::hvac_api::error_recorder::ErrorRecorder;
use crate::shared::errors::ApiError;
use crate::shared::extractors::request_id::RequestId;

use super::errors::{self, HandlerResult};

const HANDLER_NAME: &str = "logs_delete";

/// Delete a maintenance log
///
/// Succeeds whether or not the log existed.
#[utoipa::path(
    delete,
    path = "/logs/{id}",
    params(("id" = i64, Path, description = "Maintenance log id")),
    responses(
        (status = 200, description = "Log deleted or already absent"),
        (status = 400, description = "Malformed id"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "logs",
)]
#[tracing::instrument(skip_all, name = "logs_delete")]
pub async fn handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    id: Result<Path<i64>, PathRejection>,
) -> HandlerResult<StatusCode> {
    let Path(id) = id.map_err(|e| {
        ApiError::from(e).with_trace_id(request_id.to_string())
    })?;

    tracing::info!(log_id = id, request_id = %request_id, "Delete maintenance log request");

    state.metrics.record_request(HANDLER_NAME);
    let recorder = ErrorRecorder::new(&state.metrics, HANDLER_NAME, &request_id);

    state.gateway.delete_log(id).await.map_err(|e| {
        let err = errors::Error::Delete(e);
        recorder.record(err.metric_code(), err)
    })?;

    Ok(StatusCode::OK)
}
