//! Link batches handed from catalog runs to detail runs.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;

use super::json_file::{read_json, write_json};
use super::CheckpointError;

/// A directory of `<index>.json` files, each a JSON array of detail URLs.
#[derive(Debug, Clone)]
pub struct BatchStore {
    dir: PathBuf,
}

impl BatchStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn batch_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("{}.json", index))
    }

    /// Load batch `index`.
    pub async fn load(&self, index: u64) -> Result<Vec<String>, CheckpointError> {
        read_json(&self.batch_path(index))
            .await?
            .ok_or(CheckpointError::BatchNotFound(index))
    }

    /// Write batch `index`, replacing any existing one.
    pub async fn store(&self, index: u64, urls: &[String]) -> Result<(), CheckpointError> {
        write_json(&self.batch_path(index), urls).await?;
        info!("Wrote batch {} with {} links", index, urls.len());
        Ok(())
    }

    /// Index after the highest existing batch, or 0 when there is none.
    pub async fn next_index(&self) -> Result<u64, CheckpointError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(source) => {
                return Err(CheckpointError::Read {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut next = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| CheckpointError::Read {
                path: self.dir.clone(),
                source,
            })?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(index) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u64>().ok())
            {
                next = next.max(index + 1);
            }
        }
        Ok(next)
    }
}
