use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Errors surfaced by a [`crate::DraftStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("draft {0} not found")]
    NotFound(uuid::Uuid),

    #[error("invalid draft status \"{0}\"")]
    InvalidStatus(String),

    #[error("draft store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}
