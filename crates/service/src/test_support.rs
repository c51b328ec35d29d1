#![cfg(test)]
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;

use crate::storage::{BlobRead, BlobStore, MemoryBlobStore, StorageError, WriteCondition};

/// Backend whose every call fails with a non-missing storage error.
pub struct FailingBlobStore;

#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn download(&self, blob: &str) -> Result<BlobRead, StorageError> {
        Err(StorageError::Backend(format!("download {blob}: status 503 ServerBusy")))
    }

    async fn upload(&self, blob: &str, _content: Vec<u8>, _c: WriteCondition) -> Result<(), StorageError> {
        Err(StorageError::Backend(format!("upload {blob}: status 503 ServerBusy")))
    }
}

/// Memory backend that lets another writer sneak in once: right before the
/// first upload it overwrites the blob with `interloper` unconditionally.
pub struct RacingBlobStore {
    pub inner: MemoryBlobStore,
    interloper: Vec<u8>,
    fired: AtomicBool,
}

impl RacingBlobStore {
    pub fn new(inner: MemoryBlobStore, interloper: &[u8]) -> Arc<Self> {
        Arc::new(Self { inner, interloper: interloper.to_vec(), fired: AtomicBool::new(false) })
    }
}

#[async_trait]
impl BlobStore for RacingBlobStore {
    async fn download(&self, blob: &str) -> Result<BlobRead, StorageError> {
        self.inner.download(blob).await
    }

    async fn upload(&self, blob: &str, content: Vec<u8>, condition: WriteCondition) -> Result<(), StorageError> {
        if !self.fired.swap(true, Ordering::SeqCst) {
            self.inner
                .upload(blob, self.interloper.clone(), WriteCondition::Unconditional)
                .await?;
        }
        self.inner.upload(blob, content, condition).await
    }
}
