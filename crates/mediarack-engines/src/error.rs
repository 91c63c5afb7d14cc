//! Storage engine errors
//!
//! Every failure class an engine can raise during ingestion. Refusal to
//! handle an input is not an error here; engines report it through
//! [`ParseOutcome::Rejected`](crate::traits::ParseOutcome) and the pipeline
//! moves on to the next engine.

use thiserror::Error;

/// Ingestion-fatal storage failures.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Message written for direct display to the end user
    /// (e.g. "The file extension '.xyz' is not supported.").
    #[error("{0}")]
    User(String),

    #[error("Engine configuration error: {0}")]
    Config(String),

    #[error("Metadata probe failed: {0}")]
    Probe(String),

    #[error("Store failed: {0}")]
    Store(String),

    #[error("Delete failed: {0}")]
    Delete(String),

    #[error("Integrity check failed: {0}")]
    Integrity(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl StorageError {
    /// Whether the message is safe to show to the end user verbatim.
    pub fn is_user_safe(&self) -> bool {
        matches!(self, StorageError::User(_))
    }

    /// The displayable message, when one exists.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            StorageError::User(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
