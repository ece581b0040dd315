//! Error types for the task store, repository and field parsing.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or writing the persisted task collection.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem access failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The collection could not be serialized.
    #[error("failed to encode task collection: {0}")]
    Encode(#[source] serde_json::Error),

    /// The stored bytes are not a valid task collection.
    #[error("failed to decode task collection: {0}")]
    Decode(#[source] serde_json::Error),

    /// The background writer thread could not be started.
    #[error("failed to start store writer: {0}")]
    Writer(#[source] std::io::Error),

    /// A shared in-memory store was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

/// A draft was rejected before it reached the collection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors returned by [`crate::repository::TaskRepository`] mutations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("task not found: {0}")]
    NotFound(String),

    /// The requested order is not a permutation of the current ids.
    #[error("invalid reorder: {reason}")]
    InvalidReorder { reason: String },
}

/// A token did not name any variant of a closed field enum.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {field} value: {token}")]
pub struct UnknownValueError {
    pub field: &'static str,
    pub token: String,
}
