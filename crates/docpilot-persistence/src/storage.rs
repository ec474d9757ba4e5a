//! Key-by-path document storage.
//!
//! The session store never touches the filesystem directly; it goes through
//! [`DocumentStorage`] so tests and embedders can swap the backend.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::atomic::atomic_write;
use crate::error::{PersistenceError, Result};

/// Read/write access to document bodies, keyed by path.
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Reads a document. Returns `Ok(None)` if nothing was written yet.
    async fn read(&self, path: &Path) -> Result<Option<String>>;

    /// Replaces a document. Either the whole content lands or nothing changes.
    async fn write(&self, path: &Path, content: &str) -> Result<()>;

    /// Returns true if a document exists at `path`.
    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.read(path).await?.is_some())
    }
}

/// Filesystem-backed storage using atomic temp-file-and-rename writes.
#[derive(Debug, Clone, Default)]
pub struct FsDocumentStorage;

impl FsDocumentStorage {
    /// Creates a new filesystem storage.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentStorage for FsDocumentStorage {
    async fn read(&self, path: &Path) -> Result<Option<String>> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::ReadError {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    async fn write(&self, path: &Path, content: &str) -> Result<()> {
        let target = path.to_path_buf();
        let bytes = content.as_bytes().to_vec();
        trace!(path = %target.display(), bytes = bytes.len(), "Writing document");

        // The blocking write runs to completion even if the caller is dropped
        tokio::task::spawn_blocking(move || atomic_write(&target, &bytes))
            .await
            .map_err(|e| PersistenceError::Task(e.to_string()))??;

        debug!(path = %path.display(), "Document persisted");
        Ok(())
    }
}

/// In-memory storage for tests and embedding.
///
/// Writes can be switched off to simulate a failing disk.
#[derive(Debug, Default)]
pub struct MemoryDocumentStorage {
    documents: RwLock<HashMap<PathBuf, String>>,
    fail_writes: AtomicBool,
}

impl MemoryDocumentStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Returns true if nothing has been stored.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// All stored paths, sorted.
    pub async fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.documents.read().await.keys().cloned().collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl DocumentStorage for MemoryDocumentStorage {
    async fn read(&self, path: &Path) -> Result<Option<String>> {
        Ok(self.documents.read().await.get(path).cloned())
    }

    async fn write(&self, path: &Path, content: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable {
                path: path.to_path_buf(),
                reason: "writes disabled".to_string(),
            });
        }
        self.documents
            .write()
            .await
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }
}
