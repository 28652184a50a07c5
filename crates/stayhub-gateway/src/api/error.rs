//! HTTP error mapping
//!
//! Every failure leaves the gateway as `{ "error": "<message>" }` with the
//! status picked from the service error taxonomy. Store failures are logged
//! in full and answered with a generic message.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use stayhub_core::ServiceError;
use tracing::{debug, error};

const INTERNAL_ERROR: &str = "Internal server error";

/// Wire shape of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// An error ready to be rendered as an HTTP response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }
}

/// Status code for each taxonomy variant.
pub fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Conflict(_) | ServiceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        ServiceError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = status_for(&err);
        if status.is_server_error() {
            error!(kind = err.kind(), "[Gateway] Upstream failure: {:#}", err);
            return Self::new(status, INTERNAL_ERROR);
        }
        debug!(kind = err.kind(), status = status.as_u16(), "[Gateway] {}", err);
        Self::new(status, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}
