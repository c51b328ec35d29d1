//! Blob storage abstraction for the collection stores.
//!
//! A blob is fetched whole and overwritten whole. Reads report a missing blob
//! as an explicit [`BlobRead::Missing`] instead of an error, and writes carry
//! a [`WriteCondition`] so callers can guard read-modify-write cycles with
//! the etag they read.

use async_trait::async_trait;
use thiserror::Error;

pub mod azure;
pub mod file;
pub mod memory;

pub use azure::AzureBlobStore;
pub use file::FileBlobStore;
pub use memory::MemoryBlobStore;

pub const NOT_CONFIGURED_MESSAGE: &str =
    "Storage account not configured. Please set STORAGE_ACCOUNT_KEY in app settings.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub content: Vec<u8>,
    pub etag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobRead {
    Found(Blob),
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteCondition {
    /// Last writer wins.
    Unconditional,
    /// Only overwrite if the stored etag still equals this one.
    IfMatch(String),
    /// Only create; fail if the blob already exists.
    IfAbsent,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    NotConfigured(String),
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),
    #[error("{0}")]
    Backend(String),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn download(&self, blob: &str) -> Result<BlobRead, StorageError>;

    async fn upload(
        &self,
        blob: &str,
        content: Vec<u8>,
        condition: WriteCondition,
    ) -> Result<(), StorageError>;
}

/// Stand-in used when the Azure backend is selected without credentials.
/// Every call fails with [`StorageError::NotConfigured`].
#[derive(Debug, Default, Clone)]
pub struct UnconfiguredBlobStore;

#[async_trait]
impl BlobStore for UnconfiguredBlobStore {
    async fn download(&self, _blob: &str) -> Result<BlobRead, StorageError> {
        Err(StorageError::NotConfigured(NOT_CONFIGURED_MESSAGE.into()))
    }

    async fn upload(
        &self,
        _blob: &str,
        _content: Vec<u8>,
        _condition: WriteCondition,
    ) -> Result<(), StorageError> {
        Err(StorageError::NotConfigured(NOT_CONFIGURED_MESSAGE.into()))
    }
}

/// Check a write condition against the etag currently stored (if any).
pub(crate) fn check_condition(
    blob: &str,
    current: Option<&str>,
    condition: &WriteCondition,
) -> Result<(), StorageError> {
    match (condition, current) {
        (WriteCondition::Unconditional, _) => Ok(()),
        (WriteCondition::IfAbsent, None) => Ok(()),
        (WriteCondition::IfAbsent, Some(_)) => Err(StorageError::PreconditionFailed(format!(
            "blob {blob} already exists"
        ))),
        (WriteCondition::IfMatch(expected), Some(actual)) if expected == actual => Ok(()),
        (WriteCondition::IfMatch(_), _) => Err(StorageError::PreconditionFailed(format!(
            "blob {blob} changed since it was read"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_store_reports_configuration_error() {
        let store = UnconfiguredBlobStore;
        assert!(matches!(store.download("x.json").await, Err(StorageError::NotConfigured(_))));
        let res = store.upload("x.json", b"[]".to_vec(), WriteCondition::Unconditional).await;
        match res {
            Err(StorageError::NotConfigured(msg)) => assert_eq!(msg, NOT_CONFIGURED_MESSAGE),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn condition_matrix() {
        assert!(check_condition("b", None, &WriteCondition::Unconditional).is_ok());
        assert!(check_condition("b", Some("1"), &WriteCondition::Unconditional).is_ok());
        assert!(check_condition("b", None, &WriteCondition::IfAbsent).is_ok());
        assert!(check_condition("b", Some("1"), &WriteCondition::IfAbsent).is_err());
        assert!(check_condition("b", Some("1"), &WriteCondition::IfMatch("1".into())).is_ok());
        assert!(check_condition("b", Some("2"), &WriteCondition::IfMatch("1".into())).is_err());
        assert!(check_condition("b", None, &WriteCondition::IfMatch("1".into())).is_err());
    }
}
