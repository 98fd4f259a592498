use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Error envelope returned by every HVAC endpoint under the `error` key.
///
/// `message` is safe to show to clients; store failures never leak their
/// cause here, it only reaches the logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub status_code: u16,
    pub code: &'static str,
    pub message: String,
    pub details: Vec<ErrorDetail>,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,
}

/// One offending input, usually a body field or the `id` path segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub field: Option<String>,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Request id, echoed from `x-request-id` or generated per request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional: Option<Value>,
}

impl ApiError {
    pub fn new(
        status_code: StatusCode,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status_code: status_code.as_u16(),
            code,
            message: message.into(),
            details: Vec::new(),
            timestamp: Utc::now().to_rfc3339(),
            context: None,
        }
    }

    pub fn with_detail(
        mut self,
        field: Option<String>,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        self.details.push(ErrorDetail {
            field,
            code,
            message: message.into(),
        });
        self
    }

    pub fn with_details(mut self, details: Vec<ErrorDetail>) -> Self {
        self.details.extend(details);
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.context.get_or_insert_with(ErrorContext::default).trace_id =
            Some(trace_id.into());
        self
    }

    pub fn with_additional(mut self, additional: Value) -> Self {
        self.context.get_or_insert_with(ErrorContext::default).additional =
            Some(additional);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Send 5xx responses to Sentry, tagged with the code and request id.
    pub fn report_if_server_error(&self) {
        if self.status_code < 500 {
            return;
        }
        let trace_id = self
            .context
            .as_ref()
            .and_then(|context| context.trace_id.as_deref());
        sentry::with_scope(
            |scope| {
                scope.set_tag("error.code", self.code);
                if let Some(trace_id) = trace_id {
                    scope.set_tag("request_id", trace_id);
                }
            },
            || sentry::capture_message(&self.message, sentry::Level::Error),
        );
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.report_if_server_error();

        let status = self.status_code();
        (status, Json(json!({ "error": self }))).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Codes carried in `error.code` and `error.details[].code`.
pub mod codes {
    /// Body is not JSON, or the content type is wrong
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    /// Unknown route
    pub const NOT_FOUND: &str = "NOT_FOUND";
    /// Handler panicked
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
    /// Building or log storage failed
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    /// A field is missing or has the wrong JSON type
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    /// The `{id}` segment is not an integer
    pub const INVALID_PATH: &str = "INVALID_PATH";
    /// No maintenance log has the requested id
    pub const LOG_NOT_FOUND: &str = "LOG_NOT_FOUND";
}
