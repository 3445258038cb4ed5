use thiserror::Error;

/// Errors from webhook event processing.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The event carries no organization id in `call.metadata`.
    #[error("webhook payload has no organization id in metadata")]
    MissingMetadata,

    /// No local call matches the event's remote call id within the
    /// organization named by the metadata.
    #[error("no call found for remote call id {call_id}")]
    CallNotFound { call_id: String },

    #[error(transparent)]
    Database(#[from] database::DatabaseError),
}

impl From<sqlx::Error> for LifecycleError {
    fn from(e: sqlx::Error) -> Self {
        LifecycleError::Database(database::DatabaseError::Sqlx(e))
    }
}

pub type Result<T> = std::result::Result<T, LifecycleError>;
