//! Error types for reconciliation and linking.

use thiserror::Error;

/// Errors from reconciliation and assignment linking.
///
/// A reconciler returns these only for total failures; per-item variants
/// (`Decode`, `MissingRemoteId`) are caught inside the batch loop and
/// accumulate in the summary instead.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The platform call failed.
    #[error(transparent)]
    Platform(#[from] platform_client::PlatformError),

    /// A local read or write failed.
    #[error(transparent)]
    Database(#[from] database::DatabaseError),

    /// A remote item did not decode into the expected shape.
    #[error("invalid remote payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A remote item carries no usable identifier.
    #[error("remote item has no id")]
    MissingRemoteId,

    /// The bot has never been given a remote LLM config, so assignment
    /// lists cannot be pushed for it.
    #[error("bot {bot_id} has no remote LLM config")]
    MissingRemoteLlm { bot_id: String },
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
