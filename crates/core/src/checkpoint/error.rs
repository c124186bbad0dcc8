use std::path::PathBuf;

use thiserror::Error;

/// Errors reading or writing run bookkeeping.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt checkpoint {path:?}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Batch {0} not found")]
    BatchNotFound(u64),
}
