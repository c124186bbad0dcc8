use std::path::PathBuf;

use thiserror::Error;

/// Fatal storage errors. Any of them fails the run.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to open database {path:?}: {reason}")]
    Open { path: PathBuf, reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Failed to upsert content {id}: {reason}")]
    Upsert { id: i64, reason: String },

    #[error("Value out of range for content {id}: {field}")]
    OutOfRange { id: i64, field: &'static str },
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e.to_string())
    }
}
