//! Platform gateway error types.

use thiserror::Error;

/// Errors from the remote voice platform gateway.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// No tenant API key and no process-wide fallback.
    #[error("no platform API key configured for this organization")]
    CredentialMissing,

    /// The platform answered with a non-success status. The body is kept
    /// verbatim for diagnosis; requests are never retried here.
    #[error("platform API error ({status}): {body}")]
    RemoteApi { status: u16, body: String },

    /// The request never completed.
    #[error("platform request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The platform answered 2xx with a body we could not use.
    #[error("unexpected platform response: {0}")]
    InvalidResponse(String),
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
