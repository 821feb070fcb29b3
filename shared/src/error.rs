//! Error types for local snapshot persistence

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SnapshotError>;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("stored snapshot is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("snapshot store error: {0}")]
    Store(String),
}
