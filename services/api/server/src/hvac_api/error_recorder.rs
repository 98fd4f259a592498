use uuid::Uuid;

use crate::metrics::ServerMetrics;
use crate::shared::errors::ApiError;

/// Handler error types that can be rendered as an [`ApiError`].
pub trait IntoApiError {
    fn into_api_error(self, request_id: &Uuid) -> ApiError;
}

/// Records error metrics and converts handler errors to [`ApiError`].
pub struct ErrorRecorder<'a> {
    metrics: &'a ServerMetrics,
    handler_name: &'a str,
    request_id: &'a Uuid,
}

impl<'a> ErrorRecorder<'a> {
    pub fn new(
        metrics: &'a ServerMetrics,
        handler_name: &'a str,
        request_id: &'a Uuid,
    ) -> Self {
        Self {
            metrics,
            handler_name,
            request_id,
        }
    }

    pub fn record<E: IntoApiError>(&self, code: &str, e: E) -> ApiError {
        self.metrics.record_error(self.handler_name, code);
        e.into_api_error(self.request_id)
    }
}
