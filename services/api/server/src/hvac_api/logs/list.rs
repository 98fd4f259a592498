use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;
use crate::hvac_api::error_recorder::ErrorRecorder;
use crate::shared::extractors::request_id::RequestId;

use super::errors::{self, HandlerResult};
use super::models::LogRecord;

const HANDLER_NAME: &str = "logs_list";

/// List all maintenance logs, most recent first
#[utoipa::path(
    get,
    path = "/logs",
    responses(
        (status = 200, description = "All maintenance logs", body = Vec<LogRecord>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "logs",
)]
#[tracing::instrument(skip_all, name = "logs_list")]
pub async fn handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
) -> HandlerResult<(StatusCode, Json<Vec<LogRecord>>)> {
    state.metrics.record_request(HANDLER_NAME);
    let recorder = ErrorRecorder::new(&state.metrics, HANDLER_NAME, &request_id);

    let logs = state.gateway.list_logs().await.map_err(|e| {
        let err = errors::Error::Fetch(e);
        recorder.record(err.metric_code(), err)
    })?;

    Ok((
        StatusCode::OK,
        Json(logs.into_iter().map(LogRecord::from).collect()),
    ))
}
