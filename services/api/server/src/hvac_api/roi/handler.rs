use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;
use crate::hvac_api::error_recorder::ErrorRecorder;
use crate::shared::extractors::request_id::RequestId;

use super::errors::{self, HandlerResult};
use super::models::RoiResponse;

const HANDLER_NAME: &str = "roi";

/// Compute the return on investment over all maintenance logs
///
/// Sums the energy draw of every log and multiplies it by a fixed rate.
#[utoipa::path(
    get,
    path = "/roi",
    responses(
        (status = 200, description = "Aggregate ROI", body = RoiResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "roi",
)]
#[tracing::instrument(skip_all, name = "roi")]
pub async fn handler(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
) -> HandlerResult<(StatusCode, Json<RoiResponse>)> {
    state.metrics.record_request(HANDLER_NAME);
    let recorder = ErrorRecorder::new(&state.metrics, HANDLER_NAME, &request_id);

    let logs = state
        .gateway
        .list_logs()
        .await
        .map_err(|e| recorder.record("database_error", errors::Error::Fetch(e)))?;

    let response =
        RoiResponse::from_draws(logs.iter().map(|log| &log.energy_draw_kw));

    tracing::debug!(
        logs = logs.len(),
        total = %response.total_energy_units,
        request_id = %request_id,
        "Computed ROI",
    );

    Ok((StatusCode::OK, Json(response)))
}
