//! Content-addressed artifact caching.
//!
//! Expensive steps key their outputs by a digest of their input so repeated
//! jobs over the same material skip the work entirely.

use std::future::Future;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};

/// Hex SHA-256 digest of a byte string.
pub fn digest_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Hex SHA-256 digest of a file's contents, computed off the async runtime.
pub async fn digest_file(path: &Path) -> PipelineResult<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> PipelineResult<String> {
        let bytes = std::fs::read(&path)?;
        Ok(digest_hex(&bytes))
    })
    .await
    .map_err(|e| PipelineError::persistence(format!("digest task failed: {e}")))?
}

/// Get-or-compute cache over JSON artifacts on disk.
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    root: PathBuf,
}

impl ArtifactCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the artifact stored under `name`.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Return the cached artifact at `name`, or run `compute` and persist
    /// its result there. A cache file that fails to parse is recomputed.
    pub async fn get_or_compute<T, F, Fut>(&self, name: &str, compute: F) -> PipelineResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = PipelineResult<T>>,
    {
        let path = self.path_of(name);

        if let Some(cached) = self.load(&path).await {
            debug!(artifact = %path.display(), "Cache hit");
            return Ok(cached);
        }

        let value = compute().await?;
        self.store(&path, &value).await?;
        Ok(value)
    }

    /// Return the raw cached JSON value at `name`, if present and parseable.
    pub async fn get_raw(&self, name: &str) -> Option<serde_json::Value> {
        self.load(&self.path_of(name)).await
    }

    async fn load<T: DeserializeOwned>(&self, path: &Path) -> Option<T> {
        let bytes = tokio::fs::read(path).await.ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(artifact = %path.display(), error = %e, "Discarding unparseable cache file");
                None
            }
        }
    }

    async fn store<T: Serialize>(&self, path: &Path, value: &T) -> PipelineResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(path, json).await?;
        debug!(artifact = %path.display(), "Stored artifact");
        Ok(())
    }
}
