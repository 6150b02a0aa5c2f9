//! Error types for mgc-server
//!
//! Maps the service's error taxonomy onto HTTP responses with a uniform body:
//! `{"error": {"code": ..., "message": ...}}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mgc_common::validation::ValidationError;
use serde_json::json;
use thiserror::Error;

use crate::services::identity::IdentityError;
use crate::services::persistence::StoreError;
use crate::services::ClassificationError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected upload (400)
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Write attempted without a principal (401)
    #[error("User must be authenticated")]
    Unauthenticated,

    /// Wrong username or password (401)
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409), e.g. username already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Classifier unreachable or erroring, only surfaced under `FallbackPolicy::Surface` (502)
    #[error("Classification unavailable: {0}")]
    ClassificationUnavailable(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// mgc-common error
    #[error("Common error: {0}")]
    Common(#[from] mgc_common::Error),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::ClassificationUnavailable(_) => {
                (StatusCode::BAD_GATEWAY, "CLASSIFICATION_UNAVAILABLE")
            }
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Common(mgc_common::Error::InvalidInput(_)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST")
            }
            ApiError::Common(_) => (StatusCode::INTERNAL_SERVER_ERROR, "COMMON_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(code = error_code, "{}", self);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidInput(msg) => ApiError::BadRequest(msg),
            IdentityError::UsernameTaken(username) => {
                ApiError::Conflict(format!("Username already taken: {}", username))
            }
            IdentityError::InvalidCredentials => ApiError::InvalidCredentials,
            IdentityError::Hashing(msg) => ApiError::Internal(msg),
            IdentityError::Common(e) => ApiError::Common(e),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unauthenticated => ApiError::Unauthenticated,
            StoreError::Common(e) => ApiError::Common(e),
        }
    }
}

impl From<ClassificationError> for ApiError {
    fn from(err: ClassificationError) -> Self {
        ApiError::ClassificationUnavailable(err.to_string())
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
