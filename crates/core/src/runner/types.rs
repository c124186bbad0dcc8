use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::checkpoint::CheckpointError;
use crate::scroll::ScrollOutcome;
use crate::store::StoreError;

/// Fatal run errors.
#[derive(Debug, Error)]
pub enum RunError {
    /// A required resource could not be acquired.
    #[error("Setup failed: {0}")]
    Setup(String),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl RunError {
    pub fn setup(resource: &str, reason: impl Display) -> Self {
        Self::Setup(format!("{}: {}", resource, reason))
    }
}

/// Result of one detail run.
#[derive(Debug, Clone, Serialize)]
pub struct DetailRunSummary {
    /// Batch index that was consumed.
    pub batch: u64,
    /// URLs in the batch.
    pub total: usize,
    /// Records built and stored.
    pub succeeded: usize,
    /// URLs rejected (invalid id or unloadable page).
    pub failed: usize,
    /// URLs excluded by configuration.
    pub skipped: usize,
    pub inserted: usize,
    pub updated: usize,
    /// Fields stored as null because of extraction issues.
    pub field_issues: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Result of one catalog run.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogRunSummary {
    /// How scrolling ended. `errored` means nothing was extracted.
    pub outcome: ScrollOutcome,
    /// Links extracted this run after filtering.
    pub discovered: usize,
    /// Links never seen before.
    pub fresh: usize,
    /// Size of the accumulated link set after the run.
    pub total_links: usize,
    /// Contents flagged for revisit.
    pub revisits: usize,
    /// Batch index the fresh links were written to.
    pub batch: Option<u64>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
