use std::sync::Arc;

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

use super::{check_condition, Blob, BlobRead, BlobStore, StorageError, WriteCondition};

/// In-process blob store. Each upload gets a fresh random etag.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<DashMap<String, Blob>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw content of a blob, for inspection in tests.
    pub fn raw(&self, blob: &str) -> Option<Vec<u8>> {
        self.blobs.get(blob).map(|b| b.content.clone())
    }

    pub fn contains(&self, blob: &str) -> bool {
        self.blobs.contains_key(blob)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn download(&self, blob: &str) -> Result<BlobRead, StorageError> {
        Ok(match self.blobs.get(blob) {
            Some(b) => BlobRead::Found(b.clone()),
            None => BlobRead::Missing,
        })
    }

    async fn upload(
        &self,
        blob: &str,
        content: Vec<u8>,
        condition: WriteCondition,
    ) -> Result<(), StorageError> {
        let stored = Blob { content, etag: Some(Uuid::new_v4().to_string()) };
        // The entry guard holds the shard lock across check and write.
        match self.blobs.entry(blob.to_string()) {
            Entry::Occupied(mut slot) => {
                check_condition(blob, slot.get().etag.as_deref(), &condition)?;
                slot.insert(stored);
            }
            Entry::Vacant(slot) => {
                check_condition(blob, None, &condition)?;
                slot.insert(stored);
            }
        }
        Ok(())
    }
}
