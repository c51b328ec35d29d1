//! CRUD over a JSON array stored as a single blob.
//!
//! Every request round-trips to storage: load the whole collection, apply
//! the operation in memory and, for mutations, overwrite the whole blob via
//! [`BlobCollectionStore::replace_all`]. With conditional writes enabled the
//! overwrite is guarded by the etag of the snapshot that was read, so a
//! concurrent writer makes the slower request fail with a conflict instead
//! of silently losing data.

use std::{marker::PhantomData, sync::Arc};

use tracing::{debug, info, warn};

use crate::errors::ServiceError;
use crate::metrics;
use crate::storage::{BlobRead, BlobStore, StorageError, WriteCondition};

pub mod ids;
pub mod resource;

pub use ids::{next_id, parse_path_id, parse_record_id, RecordId};
pub use resource::{Resource, ResourceLabels};

struct Snapshot<T> {
    records: Vec<T>,
    etag: Option<String>,
}

pub struct BlobCollectionStore<R: Resource> {
    blobs: Arc<dyn BlobStore>,
    blob_name: String,
    conditional_writes: bool,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> BlobCollectionStore<R> {
    pub fn new(blobs: Arc<dyn BlobStore>, blob_name: impl Into<String>) -> Self {
        Self {
            blobs,
            blob_name: blob_name.into(),
            conditional_writes: true,
            _resource: PhantomData,
        }
    }

    /// Disable etag guards and fall back to last-writer-wins overwrites.
    pub fn with_conditional_writes(mut self, enabled: bool) -> Self {
        self.conditional_writes = enabled;
        self
    }

    pub fn blob_name(&self) -> &str {
        &self.blob_name
    }

    pub fn labels(&self) -> ResourceLabels {
        R::LABELS
    }

    async fn load(&self) -> Result<Option<Snapshot<R::Record>>, ServiceError> {
        metrics::BLOB_DOWNLOADS.with_label_values(&[R::LABELS.name]).inc();
        match self.blobs.download(&self.blob_name).await? {
            BlobRead::Found(blob) => {
                let records: Vec<R::Record> = serde_json::from_slice(&blob.content)?;
                debug!(resource = R::LABELS.name, blob = %self.blob_name, count = records.len(), "collection loaded");
                Ok(Some(Snapshot { records, etag: blob.etag }))
            }
            BlobRead::Missing => {
                debug!(resource = R::LABELS.name, blob = %self.blob_name, "collection blob absent");
                Ok(None)
            }
        }
    }

    fn condition_for(&self, snapshot: Option<&Snapshot<R::Record>>) -> WriteCondition {
        if !self.conditional_writes {
            return WriteCondition::Unconditional;
        }
        match snapshot {
            None => WriteCondition::IfAbsent,
            Some(Snapshot { etag: Some(etag), .. }) => WriteCondition::IfMatch(etag.clone()),
            Some(Snapshot { etag: None, .. }) => WriteCondition::Unconditional,
        }
    }

    /// Serialize the full sequence and overwrite the blob with it.
    pub async fn replace_all(
        &self,
        records: &[R::Record],
        condition: WriteCondition,
    ) -> Result<(), ServiceError> {
        let content = serde_json::to_vec_pretty(records)?;
        metrics::BLOB_UPLOADS.with_label_values(&[R::LABELS.name]).inc();
        match self.blobs.upload(&self.blob_name, content, condition).await {
            Ok(()) => Ok(()),
            Err(StorageError::PreconditionFailed(detail)) => {
                metrics::WRITE_CONFLICTS.with_label_values(&[R::LABELS.name]).inc();
                warn!(resource = R::LABELS.name, blob = %self.blob_name, %detail, "concurrent modification detected");
                Err(ServiceError::Conflict(R::LABELS.conflict.into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Current records, seeding the collection if it has never been written.
    async fn current_records(&self) -> Result<Vec<R::Record>, ServiceError> {
        if let Some(snapshot) = self.load().await? {
            return Ok(snapshot.records);
        }
        let Some(seed) = R::seed() else {
            return Ok(Vec::new());
        };
        let condition = self.condition_for(None);
        match self.replace_all(&seed, condition).await {
            Ok(()) => {
                info!(resource = R::LABELS.name, blob = %self.blob_name, count = seed.len(), "collection seeded with defaults");
                Ok(seed)
            }
            // Another request seeded first; return what it wrote.
            Err(ServiceError::Conflict(_)) => Ok(self.load().await?.map(|s| s.records).unwrap_or(seed)),
            Err(e) => Err(e),
        }
    }

    /// Whole collection, in read-time listing order.
    pub async fn list(&self) -> Result<Vec<R::Record>, ServiceError> {
        metrics::record_op(R::LABELS.name, "list");
        let mut records = self.current_records().await?;
        R::order_for_listing(&mut records);
        Ok(records)
    }

    /// Single record by path id.
    pub async fn get(&self, raw_id: &str) -> Result<R::Record, ServiceError> {
        metrics::record_op(R::LABELS.name, "get");
        let records = self.current_records().await?;
        parse_path_id(raw_id)
            .and_then(|id| records.into_iter().find(|r| R::id(r).matches(id)))
            .ok_or_else(|| ServiceError::NotFound(R::LABELS.not_found.into()))
    }

    pub async fn create(&self, input: R::Input) -> Result<R::Record, ServiceError> {
        metrics::record_op(R::LABELS.name, "create");
        let fields = R::validate(input)?;
        let snapshot = self.load().await?;
        let condition = self.condition_for(snapshot.as_ref());
        let mut records = snapshot.map(|s| s.records).unwrap_or_default();

        let id = next_id(records.iter().map(R::id), R::ID_PREFIX).ok_or_else(|| {
            ServiceError::Storage(format!("{} has no id left after {}", self.blob_name, i64::MAX))
        })?;
        let record = R::create(id, fields);
        records.push(record.clone());
        self.replace_all(&records, condition).await?;

        info!(resource = R::LABELS.name, id, "record created");
        Ok(record)
    }

    pub async fn update(&self, raw_id: Option<&str>, input: R::Input) -> Result<R::Record, ServiceError> {
        metrics::record_op(R::LABELS.name, "update");
        let raw_id = require_id::<R>(raw_id)?;
        let fields = R::validate(input)?;
        let snapshot = self
            .load()
            .await?
            .ok_or_else(|| ServiceError::NotFound(R::LABELS.collection_missing.into()))?;
        let condition = self.condition_for(Some(&snapshot));
        let mut records = snapshot.records;

        let (index, id) = locate::<R>(&records, raw_id)?;
        let updated = R::update(id, &records[index], fields);
        records[index] = updated.clone();
        self.replace_all(&records, condition).await?;

        info!(resource = R::LABELS.name, id, "record updated");
        Ok(updated)
    }

    /// Remove a record and return it as it was before deletion.
    pub async fn remove(&self, raw_id: Option<&str>) -> Result<R::Record, ServiceError> {
        metrics::record_op(R::LABELS.name, "remove");
        let raw_id = require_id::<R>(raw_id)?;
        let snapshot = self
            .load()
            .await?
            .ok_or_else(|| ServiceError::NotFound(R::LABELS.collection_missing.into()))?;
        let condition = self.condition_for(Some(&snapshot));
        let mut records = snapshot.records;

        let (index, id) = locate::<R>(&records, raw_id)?;
        let removed = records.remove(index);
        self.replace_all(&records, condition).await?;

        info!(resource = R::LABELS.name, id, "record removed");
        Ok(removed)
    }
}

fn require_id<R: Resource>(raw_id: Option<&str>) -> Result<&str, ServiceError> {
    raw_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ServiceError::Validation(R::LABELS.id_required.into()))
}

fn locate<R: Resource>(records: &[R::Record], raw_id: &str) -> Result<(usize, i64), ServiceError> {
    parse_path_id(raw_id)
        .and_then(|id| records.iter().position(|r| R::id(r).matches(id)).map(|i| (i, id)))
        .ok_or_else(|| ServiceError::NotFound(R::LABELS.not_found.into()))
}
