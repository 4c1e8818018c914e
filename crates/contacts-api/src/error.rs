//! Error types for the contacts service
//!
//! [`ServerError`] covers startup (configuration, storage, listen address);
//! [`ApiError`] is what request handlers return and renders the JSON payload
//! API consumers see.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use contacts_core::{InvalidSchema, Violation};

use crate::storage::StorageError;

/// Startup and CLI errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),
}

impl ServerError {
    /// Whether the error comes from user input rather than the service itself
    pub fn is_user_error(&self) -> bool {
        !matches!(self, ServerError::Storage(_))
    }
}

pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Errors returned by request handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// A record failed the schema check
    #[error(transparent)]
    Record(#[from] Violation),

    /// A submitted schema document was rejected
    #[error(transparent)]
    Schema(#[from] InvalidSchema),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotFound(_) => "not_found",
            ApiError::Internal(_) => "internal_error",
            ApiError::Record(violation) => violation.code(),
            ApiError::Schema(_) => InvalidSchema::CODE,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) | ApiError::Record(_) | ApiError::Schema(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }

    /// JSON payload sent to the client
    pub fn body(&self) -> serde_json::Value {
        match self {
            // Violation already serializes as {"code": .., "field": .., ..}
            ApiError::Record(violation) => json!(violation),
            ApiError::Schema(invalid) => json!({
                "code": InvalidSchema::CODE,
                "field": invalid.field,
                "param": invalid.param,
                "message": invalid.message,
            }),
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Internal(msg) => {
                json!({ "code": self.error_code(), "message": msg })
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(id) => ApiError::NotFound(format!("Contact {} not found", id)),
            StorageError::InvalidName(name) => {
                ApiError::BadRequest(format!("Invalid file name: {}", name))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(msg) = &self {
            tracing::error!(error = %msg, "request failed");
        }
        (self.status_code(), Json(self.body())).into_response()
    }
}
