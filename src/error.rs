// HTTP and startup error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use thiserror::Error;

/// A single field-level validation failure, reported in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub location: String,
    pub field: String,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(
        location: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            field: field.into(),
            message: message.into(),
        }
    }
}

/// HTTP API error with appropriate status codes and client-friendly bodies.
///
/// Absence of a record is not represented here: handlers signal it with an
/// empty 404 response rather than an error object.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation { errors: Vec<ValidationFailure> },

    // 401 Unauthorized
    Unauthorized(String),

    // 500 Internal Server Error
    Internal(String),
}

impl ApiError {
    pub fn validation(errors: Vec<ValidationFailure>) -> Self {
        ApiError::Validation { errors }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation { .. } => "request validation failed",
            ApiError::Unauthorized(msg) => msg,
            ApiError::Internal(msg) => msg,
        }
    }

    /// Convert to a JSON response body.
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Validation { errors } => {
                json!({
                    "error": true,
                    "code": self.error_code(),
                    "message": self.message(),
                    "errors": errors,
                })
            }
            _ => {
                json!({
                    "error": true,
                    "code": self.error_code(),
                    "message": self.message(),
                })
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

/// Fatal configuration errors raised during `initialize`. There is no
/// recovery path: the host should refuse to start.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown auth method: {0}")]
    UnknownAuthMethod(String),

    #[error("unknown session type: {0}")]
    UnknownSessionKind(String),

    #[error("session secret required for cookie sessions")]
    MissingSessionSecret,

    #[error("service account key required to initialize the credential store")]
    MissingCredential,

    #[error("failed to read service account key from {path}: {source}")]
    CredentialRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid service account key: {0}")]
    InvalidCredential(String),
}

/// Errors surfaced by the storage collaborator. The Action layer catches
/// these, logs them, and serializes them into a 500 response.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("document {0} already exists")]
    AlreadyExists(String),

    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("storage operation failed: {0}")]
    Backend(String),
}
