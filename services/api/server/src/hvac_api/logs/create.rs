use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;
use crate::hvac_api::error_recorder::ErrorRecorder;
use crate::shared::extractors::request_id::RequestId;
use crate::shared::extractors::validations::ValidatedPayload;

use super::errors::{self, HandlerResult};
use super::models::{CreateLogRequest, LogRecord};

const HANDLER_NAME: &str = "logs_create";

/// Record a maintenance event
///
/// The building is created on the fly if it does not exist yet. Without a
/// timestamp the log is stamped with the current time.
#[utoipa::path(
    post,
    path = "/logs",
    request_body = CreateLogRequest,
    responses(
        (status = 200, description = "Created maintenance log", body = LogRecord),
        (status = 400, description = "Malformed or invalid body"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "logs",
)]
#[tracing::instrument(skip_all, name = "logs_create")]
pub async fn handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    ValidatedPayload(payload): ValidatedPayload<CreateLogRequest>,
) -> HandlerResult<(StatusCode, Json<LogRecord>)> {
    tracing::info!(
        building_name = %payload.building_name,
        maintenance_type = %payload.maintenance_type,
        energy_draw_kw = %payload.energy_draw_kw,
        timestamp = ?payload.timestamp,
        request_id = %request_id,
        "Create maintenance log request",
    );

    if !payload.maintenance_type.is_known() {
        tracing::debug!(
            maintenance_type = %payload.maintenance_type,
            "Keeping unrecognised maintenance type label",
        );
    }

    state.metrics.record_request(HANDLER_NAME);
    let recorder = ErrorRecorder::new(&state.metrics, HANDLER_NAME, &request_id);

    let created = state.gateway.create_log(payload.into()).await.map_err(|e| {
        let err = errors::Error::from_create(e);
        recorder.record(err.metric_code(), err)
    })?;

    Ok((StatusCode::OK, Json(created.into())))
}
