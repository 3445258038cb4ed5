//! Error types for the admin API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use database::DatabaseError;
use platform_client::PlatformError;

/// Errors that can occur in API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request body or parameters.
    #[error("{0}")]
    Validation(String),

    /// Missing or unusable identity headers.
    #[error("{0}")]
    Unauthorized(String),

    /// The caller's role does not permit the operation.
    #[error("{0}")]
    Forbidden(String),

    /// A scoped lookup found nothing.
    #[error("{0}")]
    NotFound(String),

    /// The organization has no usable platform API key. Surfaced as a
    /// configuration prompt rather than a failure.
    #[error("No voice platform API key is configured for this organization")]
    Credential,

    /// The remote platform rejected a call.
    #[error("platform API error ({status}): {body}")]
    Platform { status: u16, body: String },

    /// Database error.
    #[error("Database error: {0}")]
    Database(DatabaseError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Credential => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Platform { status, body } => {
                tracing::error!("Platform error {}: {}", status, body);
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            ApiError::Database(err) => match err {
                DatabaseError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
                DatabaseError::AlreadyExists { .. } => (StatusCode::CONFLICT, err.to_string()),
                _ => {
                    tracing::error!("Database error: {}", err);
                    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
                }
            },
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::Database(err)
    }
}

impl From<PlatformError> for ApiError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::CredentialMissing => ApiError::Credential,
            PlatformError::RemoteApi { status, body } => ApiError::Platform { status, body },
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<sync::SyncError> for ApiError {
    fn from(err: sync::SyncError) -> Self {
        match err {
            sync::SyncError::Platform(e) => e.into(),
            sync::SyncError::Database(e) => e.into(),
            sync::SyncError::MissingRemoteLlm { bot_id } => {
                ApiError::Validation(format!("bot {bot_id} has no remote LLM config"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<call_tools::ToolError> for ApiError {
    fn from(err: call_tools::ToolError) -> Self {
        match err {
            call_tools::ToolError::Database(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
