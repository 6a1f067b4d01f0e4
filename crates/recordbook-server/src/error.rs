use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use recordbook_shared::{ErrorBody, ErrorKind, FieldError};
use recordbook_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("E-mail already in use")]
    Conflict(String),

    #[error("Record {0} not found")]
    NotFound(i64),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(fields) => ServerError::Validation(fields),
            StoreError::DuplicateEmail(email) => ServerError::Conflict(email),
            StoreError::NotFound(id) => ServerError::NotFound(id),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            // Well-formed JSON that does not fit the input shape: missing or
            // unknown fields, wrong types.
            JsonRejection::JsonDataError(e) => {
                ServerError::Validation(vec![FieldError::new("body", e.body_text())])
            }
            other => ServerError::BadRequest(other.body_text()),
        }
    }
}

impl From<PathRejection> for ServerError {
    fn from(rejection: PathRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ServerError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new(ErrorKind::Validation, self.to_string()).with_fields(fields.clone()),
            ),
            ServerError::Conflict(_) => (
                StatusCode::CONFLICT,
                ErrorBody::new(ErrorKind::Conflict, self.to_string()),
            ),
            ServerError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                ErrorBody::new(ErrorKind::NotFound, self.to_string()),
            ),
            ServerError::BadRequest(_) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new(ErrorKind::BadRequest, self.to_string()),
            ),
            ServerError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new(ErrorKind::Internal, "Internal server error"),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
