use crate::shared::errors::{ApiError, ErrorDetail, codes, validation_error};
use crate::shared::extractors::payload;
use crate::shared::extractors::payload::Payload;
use crate::shared::extractors::request_id::request_id_from_headers;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use std::borrow::Cow;
use thiserror::Error;
use uuid::Uuid;

/// ValidatedPayload uses the full request body and therefore should always appear after
/// other extractors that might implement FromRequestParts instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedPayload<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedPayload<T>
where
    T: serde::de::DeserializeOwned + validator::Validate,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        // Extract request ID from header before consuming the request body
        let request_id = request_id_from_headers(req.headers());

        let Payload(value) = Payload::<T>::from_request(req, state)
            .await
            .map_err(|e| Error::Payload(e, request_id))?;

        match value.validate() {
            Ok(_) => Ok(ValidatedPayload(value)),
            Err(e) => Err(Error::Validation(e, request_id)),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation failed")]
    Validation(validator::ValidationErrors, Uuid),

    #[error("Payload error")]
    Payload(payload::Error, Uuid),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(value: Error) -> Self {
        match value {
            Error::Payload(err, request_id) => {
                ApiError::from(err).with_trace_id(request_id.to_string())
            }
            Error::Validation(err, request_id) => {
                let details = validation_errors_to_details(&err);
                let message = details
                    .iter()
                    .map(|d| d.message.clone())
                    .collect::<Vec<_>>()
                    .join("; ");

                validation_error(message)
                    .with_details(details)
                    .with_trace_id(request_id.to_string())
            }
        }
    }
}

/// Flattens ValidationErrors into field details.
///
/// Nested fields are reported as `parent.field`, list items as
/// `parent[index].field`.
pub fn validation_errors_to_details(
    errors: &validator::ValidationErrors,
) -> Vec<ErrorDetail> {
    let mut details = Vec::new();
    format_validation_errors_recursive(errors, None, &mut details);
    details
}

fn format_validation_errors_recursive(
    errors: &validator::ValidationErrors,
    parent_path: Option<&str>,
    output: &mut Vec<ErrorDetail>,
) {
    for (field, kind) in errors.errors() {
        let current_path = match parent_path {
            Some(p) => format!("{}.{}", p, field),
            None => field.to_string(),
        };

        match kind {
            validator::ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let (field_name, message) = match current_path.as_str() {
                        // struct-level validation
                        "__all__" => (
                            error.code.to_string(),
                            error
                                .message
                                .clone()
                                .unwrap_or(Cow::Borrowed("validation failed"))
                                .to_string(),
                        ),
                        _ => {
                            let reason =
                                error.message.as_ref().unwrap_or(&error.code);
                            (
                                current_path.clone(),
                                format!(
                                    "`{}` failed validation: {}",
                                    current_path, reason
                                ),
                            )
                        }
                    };

                    output.push(ErrorDetail {
                        field: Some(field_name),
                        code: codes::VALIDATION_ERROR,
                        message,
                    });
                }
            }
            validator::ValidationErrorsKind::Struct(struct_errors) => {
                format_validation_errors_recursive(
                    struct_errors,
                    Some(&current_path),
                    output,
                );
            }
            validator::ValidationErrorsKind::List(list_errors) => {
                for (index, item_errors) in list_errors {
                    let item_path = format!("{}[{}]", current_path, index);
                    format_validation_errors_recursive(
                        item_errors,
                        Some(&item_path),
                        output,
                    );
                }
            }
        }
    }
}
