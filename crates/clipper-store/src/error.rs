//! Store error types.

use clipper_models::InvalidDocumentId;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    InvalidId(#[from] InvalidDocumentId),

    #[error("Database not available: {0}")]
    Unavailable(String),

    #[error("Invalid store configuration: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn auth_error(msg: impl Into<String>) -> Self {
        Self::AuthError(msg.into())
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Map a non-success HTTP status from the store's REST API.
    pub fn from_http_status(status: u16, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        match status {
            401 => Self::AuthError(msg),
            403 => Self::PermissionDenied(msg),
            404 => Self::NotFound(msg),
            409 => Self::AlreadyExists(msg),
            500..=599 => Self::ServerError(status, msg),
            _ => Self::RequestFailed(msg),
        }
    }

    /// True if the backend could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        match self {
            StoreError::Unavailable(_) => true,
            StoreError::ServerError(503, _) => true,
            StoreError::Network(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_status() {
        assert!(matches!(StoreError::from_http_status(401, "x"), StoreError::AuthError(_)));
        assert!(matches!(StoreError::from_http_status(403, "x"), StoreError::PermissionDenied(_)));
        assert!(matches!(StoreError::from_http_status(404, "x"), StoreError::NotFound(_)));
        assert!(matches!(StoreError::from_http_status(409, "x"), StoreError::AlreadyExists(_)));
        assert!(matches!(StoreError::from_http_status(502, "x"), StoreError::ServerError(502, _)));
        assert!(matches!(StoreError::from_http_status(400, "x"), StoreError::RequestFailed(_)));
    }

    #[test]
    fn test_is_unavailable() {
        assert!(StoreError::unavailable("down").is_unavailable());
        assert!(StoreError::ServerError(503, "x".into()).is_unavailable());
        assert!(!StoreError::ServerError(500, "x".into()).is_unavailable());
        assert!(!StoreError::not_found("x").is_unavailable());
    }

    #[test]
    fn test_invalid_id_message() {
        let err: StoreError = InvalidDocumentId("abc".into()).into();
        assert_eq!(err.to_string(), "invalid document id: \"abc\"");
    }
}
