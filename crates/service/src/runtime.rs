//! Construction of the storage backend and collection stores from config.
//!
//! Everything is built once at process start and handed to the HTTP layer;
//! there is no global storage client.

use std::{sync::Arc, time::Duration};

use configs::{StorageBackend, StorageConfig};
use tracing::{info, warn};

use crate::collection::BlobCollectionStore;
use crate::errors::ServiceError;
use crate::resources::{BoardMembers, ImpactGoals, NamingOpportunities};
use crate::storage::{AzureBlobStore, BlobStore, FileBlobStore, MemoryBlobStore, UnconfiguredBlobStore};

/// The three collection stores sharing one blob backend.
#[derive(Clone)]
pub struct Collections {
    pub board_members: Arc<BlobCollectionStore<BoardMembers>>,
    pub impact_goals: Arc<BlobCollectionStore<ImpactGoals>>,
    pub naming_opportunities: Arc<BlobCollectionStore<NamingOpportunities>>,
}

impl Collections {
    pub fn new(blobs: Arc<dyn BlobStore>, cfg: &StorageConfig) -> Self {
        let conditional = cfg.conditional_writes;
        Self {
            board_members: Arc::new(
                BlobCollectionStore::new(Arc::clone(&blobs), cfg.blobs.board_members.clone())
                    .with_conditional_writes(conditional),
            ),
            impact_goals: Arc::new(
                BlobCollectionStore::new(Arc::clone(&blobs), cfg.blobs.impact_goals.clone())
                    .with_conditional_writes(conditional),
            ),
            naming_opportunities: Arc::new(
                BlobCollectionStore::new(blobs, cfg.blobs.naming_opportunities.clone())
                    .with_conditional_writes(conditional),
            ),
        }
    }
}

/// Build the blob backend selected by `storage.backend`.
///
/// The Azure backend without an account key does not fail startup: requests
/// answer with the storage-configuration error instead.
pub async fn build_blob_store(cfg: &StorageConfig) -> Result<Arc<dyn BlobStore>, ServiceError> {
    let store: Arc<dyn BlobStore> = match cfg.backend {
        StorageBackend::Azure => match cfg.account_key() {
            Some(key) => {
                let endpoint = cfg.endpoint();
                info!(backend = "azure", %endpoint, container = %cfg.container, "blob storage configured");
                Arc::new(AzureBlobStore::new(
                    cfg.account_name.clone(),
                    key,
                    endpoint,
                    cfg.container.clone(),
                    Duration::from_secs(cfg.request_timeout_secs),
                )?)
            }
            None => {
                warn!(backend = "azure", "STORAGE_ACCOUNT_KEY not set; collection requests will fail");
                Arc::new(UnconfiguredBlobStore)
            }
        },
        StorageBackend::File => {
            info!(backend = "file", dir = %cfg.data_dir, "blob storage configured");
            Arc::new(FileBlobStore::new(&cfg.data_dir).await?)
        }
        StorageBackend::Memory => {
            warn!(backend = "memory", "blob storage is in-memory; data is lost on restart");
            Arc::new(MemoryBlobStore::new())
        }
    };
    Ok(store)
}
