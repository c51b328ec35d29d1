use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};
use tokio::{fs, sync::Mutex};

use super::{check_condition, Blob, BlobRead, BlobStore, StorageError, WriteCondition};

/// Local directory blob store: one file per blob, etag = content hash.
///
/// Writes go to a temporary sibling file and are renamed into place, so a
/// reader never observes a half-written blob. Uploads are serialized through
/// a mutex so the condition check and the rename happen as one step.
pub struct FileBlobStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileBlobStore {
    /// Create the store rooted at `root`, creating the directory if missing.
    pub async fn new<P: Into<PathBuf>>(root: P) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::Backend(format!("cannot create {}: {e}", root.display())))?;
        Ok(Self { root, write_lock: Mutex::new(()) })
    }

    fn path_for(&self, blob: &str) -> Result<PathBuf, StorageError> {
        let name = Path::new(blob);
        if blob.is_empty() || name.components().count() != 1 || blob.starts_with('.') {
            return Err(StorageError::Backend(format!("invalid blob name {blob:?}")));
        }
        Ok(self.root.join(name))
    }

    async fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Backend(format!("read {}: {e}", path.display()))),
        }
    }
}

fn content_etag(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    format!("\"{}\"", STANDARD.encode(digest))
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn download(&self, blob: &str) -> Result<BlobRead, StorageError> {
        let path = self.path_for(blob)?;
        Ok(match self.read(&path).await? {
            Some(content) => {
                let etag = Some(content_etag(&content));
                BlobRead::Found(Blob { content, etag })
            }
            None => BlobRead::Missing,
        })
    }

    async fn upload(
        &self,
        blob: &str,
        content: Vec<u8>,
        condition: WriteCondition,
    ) -> Result<(), StorageError> {
        let path = self.path_for(blob)?;
        let _guard = self.write_lock.lock().await;

        if condition != WriteCondition::Unconditional {
            let current = self.read(&path).await?.map(|c| content_etag(&c));
            check_condition(blob, current.as_deref(), &condition)?;
        }

        let tmp = self.root.join(format!(".{blob}.tmp"));
        fs::write(&tmp, &content)
            .await
            .map_err(|e| StorageError::Backend(format!("write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| StorageError::Backend(format!("rename into {}: {e}", path.display())))?;
        Ok(())
    }
}
