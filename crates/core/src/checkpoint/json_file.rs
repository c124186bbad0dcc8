//! JSON-file checkpoints.

use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tracing::debug;

use super::{CheckpointError, KeyValueCheckpoint};

/// A value stored as a JSON document in one file.
///
/// Writes go to a sibling temp file that is then renamed over the target, so
/// a crash never leaves a half-written checkpoint.
pub struct JsonFileCheckpoint<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileCheckpoint<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl<T> KeyValueCheckpoint<T> for JsonFileCheckpoint<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn load(&self) -> Result<Option<T>, CheckpointError> {
        read_json(&self.path).await
    }

    async fn save(&self, value: &T) -> Result<(), CheckpointError> {
        write_json(&self.path, value).await
    }
}

pub(super) async fn read_json<T: DeserializeOwned>(
    path: &Path,
) -> Result<Option<T>, CheckpointError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(CheckpointError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| CheckpointError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

pub(super) async fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), CheckpointError> {
    let write_err = |source| CheckpointError::Write {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_vec_pretty(value).map_err(|e| CheckpointError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    fs::write(&temp, json).await.map_err(write_err)?;
    fs::rename(&temp, path).await.map_err(write_err)?;

    debug!("Wrote checkpoint {:?}", path);
    Ok(())
}
