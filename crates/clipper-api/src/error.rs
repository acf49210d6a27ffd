//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use clipper_models::{SchemaError, Violation};
use clipper_store::StoreError;
use serde::Serialize;
use thiserror::Error;

use crate::config::is_production_environment;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(SchemaError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Database not available")]
    StoreUnavailable,

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Validation(_) => "validation_error",
            ApiError::NotFound(_) => "not_found",
            ApiError::PayloadTooLarge(_) => "payload_too_large",
            ApiError::StoreUnavailable => "store_unavailable",
            ApiError::Store(_) => "store_error",
        }
    }

    fn is_internal(&self) -> bool {
        matches!(self, ApiError::Store(_))
    }
}

/// An unreachable backend is reported like a missing one.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if err.is_unavailable() {
            tracing::warn!(error = %err, "Document store unavailable");
            Self::StoreUnavailable
        } else {
            Self::Store(err)
        }
    }
}

impl From<SchemaError> for ApiError {
    fn from(err: SchemaError) -> Self {
        Self::Validation(err)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<Violation>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.is_internal() {
            tracing::error!(error = %self, "Request failed");
        }

        // Don't expose internal error details in production
        let detail = if self.is_internal() && is_production() {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let code = Some(self.code());
        let errors = match self {
            ApiError::Validation(err) => Some(err.violations),
            _ => None,
        };

        (status, Json(ErrorResponse { detail, code, errors })).into_response()
    }
}

// Responses are built without access to the app state.
fn is_production() -> bool {
    std::env::var("ENVIRONMENT")
        .map(|v| is_production_environment(&v))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipper_models::schema::codes;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::StoreUnavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            ApiError::from(StoreError::request_failed("x")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::PayloadTooLarge("x".into()).status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_unreachable_store_maps_to_unavailable() {
        assert!(matches!(
            ApiError::from(StoreError::unavailable("connection refused")),
            ApiError::StoreUnavailable
        ));
        assert!(matches!(
            ApiError::from(StoreError::ServerError(503, "x".into())),
            ApiError::StoreUnavailable
        ));
        assert!(matches!(
            ApiError::from(StoreError::ServerError(500, "x".into())),
            ApiError::Store(_)
        ));
    }

    #[test]
    fn test_detail_is_message_verbatim() {
        assert_eq!(ApiError::not_found("Job tidak ditemukan").to_string(), "Job tidak ditemukan");
        assert_eq!(ApiError::StoreUnavailable.to_string(), "Database not available");
    }

    #[test]
    fn test_validation_carries_violations() {
        let err: ApiError = SchemaError::single(Violation::new("end_sec", codes::RANGE, "must be >= 0")).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "end_sec: must be >= 0");
    }
}
