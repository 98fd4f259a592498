use axum::extract::rejection::BytesRejection;
use axum::extract::{FromRequest, Request};
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::shared::errors::{ApiError, bad_request, codes};

/// JSON body extractor that reports the path of the offending field.
#[derive(Debug, Clone, Copy, Default)]
#[must_use]
pub struct Payload<T>(pub T);

impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        if !json_content_type(req.headers()) {
            return Err(Error::MissingJsonContentType);
        }

        let bytes = Bytes::from_request(req, state).await?;
        let deserializer = &mut serde_json::Deserializer::from_slice(&bytes);
        let value: T = serde_path_to_error::deserialize(deserializer)?;

        Ok(Payload(value))
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Bytes(#[from] BytesRejection),

    #[error(transparent)]
    Json(#[from] serde_path_to_error::Error<serde_json::Error>),

    #[error("missing content-type header")]
    MissingJsonContentType,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(value: Error) -> Self {
        match value {
            Error::Json(err) => {
                let path = err.path().to_string();
                let inner = err.inner().to_string();

                if path.is_empty() || path == "." {
                    let field = extract_missing_field_from_message(&inner);
                    bad_request("Cannot parse JSON").with_detail(
                        field,
                        codes::INVALID_REQUEST,
                        format!("Invalid JSON: {inner}"),
                    )
                } else {
                    bad_request("Cannot parse JSON").with_detail(
                        Some(path.clone()),
                        codes::INVALID_REQUEST,
                        format!("Invalid value for field '{path}': {inner}"),
                    )
                }
            }
            Error::MissingJsonContentType => bad_request("Cannot parse JSON")
                .with_detail(
                    Some("Content-Type".to_string()),
                    codes::INVALID_REQUEST,
                    "Content-Type header must be application/json",
                ),
            Error::Bytes(err) => bad_request("Cannot parse JSON").with_detail(
                None,
                codes::INVALID_REQUEST,
                format!("Unable to read request body: {err}"),
            ),
        }
    }
}

fn json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(header::CONTENT_TYPE) else {
        return false;
    };

    let Ok(content_type) = content_type.to_str() else {
        return false;
    };

    let Ok(mime) = content_type.parse::<mime::Mime>() else {
        return false;
    };

    mime.type_() == "application"
        && (mime.subtype() == "json"
            || mime.suffix().is_some_and(|name| name == "json"))
}

/// Extracts the field name from a serde "missing field" error message
/// Example: "missing field `energy_draw_kw`" -> Some("energy_draw_kw")
pub(crate) fn extract_missing_field_from_message(message: &str) -> Option<String> {
    let start = message.find("missing field")?;
    let after_missing = &message[start + "missing field".len()..];

    let open = after_missing.find('`')?;
    let close = after_missing[open + 1..].find('`')?;
    Some(after_missing[open + 1..open + 1 + close].to_string())
}
