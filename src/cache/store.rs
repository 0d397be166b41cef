//! Persistent tier.
//!
//! DESIGN
//! ======
//! `FileStore` keeps one payload file and one JSON sidecar per key under a root
//! directory. File names are the SHA-256 hex digest of the namespaced key, so any URL
//! maps to a flat, filesystem-safe name. The sidecar is written after the payload; a
//! reader that finds no sidecar treats the key as absent.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::CacheEntry;

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store metadata is corrupt: {0}")]
    Metadata(#[from] serde_json::Error),
    #[error("stored payload is {found} bytes, metadata says {expected}")]
    SizeMismatch { expected: usize, found: usize },
}

// =============================================================================
// TRAIT
// =============================================================================

/// Key-value storage that survives restarts. Enables test doubles for the disk.
#[async_trait::async_trait]
pub trait PersistentStore: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the entry exists but cannot be read back.
    async fn read(&self, key: &str) -> Result<Option<CacheEntry>, StoreError>;

    /// # Errors
    ///
    /// Returns a [`StoreError`] if the entry cannot be written.
    async fn write(&self, key: &str, entry: &CacheEntry) -> Result<(), StoreError>;

    /// Remove `key`. Deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if an existing entry cannot be removed.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

// =============================================================================
// FILE STORE
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct Sidecar {
    source_url: String,
    stored_at_epoch_ms: i64,
    size_bytes: usize,
}

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn paths(&self, key: &str) -> (PathBuf, PathBuf) {
        let name = hex::encode(Sha256::digest(key.as_bytes()));
        (self.root.join(format!("{name}.bin")), self.root.join(format!("{name}.json")))
    }
}

#[async_trait::async_trait]
impl PersistentStore for FileStore {
    async fn read(&self, key: &str) -> Result<Option<CacheEntry>, StoreError> {
        let (payload_path, sidecar_path) = self.paths(key);

        let Some(raw) = read_optional(&sidecar_path).await? else {
            return Ok(None);
        };
        let sidecar: Sidecar = serde_json::from_slice(&raw)?;

        let Some(payload) = read_optional(&payload_path).await? else {
            return Ok(None);
        };
        if payload.len() != sidecar.size_bytes {
            return Err(StoreError::SizeMismatch { expected: sidecar.size_bytes, found: payload.len() });
        }

        Ok(Some(CacheEntry {
            bytes: Bytes::from(payload),
            source_url: sidecar.source_url,
            stored_at_epoch_ms: sidecar.stored_at_epoch_ms,
            size_bytes: sidecar.size_bytes,
        }))
    }

    async fn write(&self, key: &str, entry: &CacheEntry) -> Result<(), StoreError> {
        let (payload_path, sidecar_path) = self.paths(key);
        tokio::fs::create_dir_all(&self.root).await?;

        tokio::fs::write(&payload_path, &entry.bytes).await?;
        let sidecar = Sidecar {
            source_url: entry.source_url.clone(),
            stored_at_epoch_ms: entry.stored_at_epoch_ms,
            size_bytes: entry.size_bytes,
        };
        tokio::fs::write(&sidecar_path, serde_json::to_vec(&sidecar)?).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let (payload_path, sidecar_path) = self.paths(key);
        remove_optional(&sidecar_path).await?;
        remove_optional(&payload_path).await?;
        Ok(())
    }
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, std::io::Error> {
    match tokio::fs::read(path).await {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

async fn remove_optional(path: &Path) -> Result<(), std::io::Error> {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
