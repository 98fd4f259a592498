use axum::Json;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::AppState;
use crate::hvac_api::error_recorder::ErrorRecorder;
use crate::shared::errors::ApiError;
use crate::shared::extractors::request_id::RequestId;
use crate::shared::extractors::validations::ValidatedPayload;

use super::errors::{self, HandlerResult};
use super::models::{LogRecord, UpdateLogRequest};

const HANDLER_NAME: &str = "logs_update";

/// Replace building, type and energy draw of a maintenance log
///
/// The timestamp is left untouched.
#[utoipa::path(
    put,
    path = "/logs/{id}",
    params(("id" = i64, Path, description = "Maintenance log id")),
    request_body = UpdateLogRequest,
    responses(
        (status = 200, description = "Updated maintenance log", body = LogRecord),
        (status = 400, description = "Malformed body or id"),
        (status = 404, description = "Log not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "logs",
)]
#[tracing::instrument(skip_all, name = "logs_update")]
pub async fn handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    id: Result<Path<i64>, PathRejection>,
    ValidatedPayload(payload): ValidatedPayload<UpdateLogRequest>,
) -> HandlerResult<(StatusCode, Json<LogRecord>)> {
    let Path(id) = id.map_err(|e| {
        ApiError::from(e).with_trace_id(request_id.to_string())
    })?;

    tracing::info!(
        log_id = id,
        building_name = %payload.building_name,
        maintenance_type = %payload.maintenance_type,
        energy_draw_kw = %payload.energy_draw_kw,
        request_id = %request_id,
        "Update maintenance log request",
    );

    state.metrics.record_request(HANDLER_NAME);
    let recorder = ErrorRecorder::new(&state.metrics, HANDLER_NAME, &request_id);

    let updated = state
        .gateway
        .update_log(id, payload.into())
        .await
        .map_err(|e| {
            let err = errors::Error::from_update(e);
            recorder.record(err.metric_code(), err)
        })?;

    Ok((StatusCode::OK, Json(updated.into())))
}
