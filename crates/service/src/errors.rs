use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    StorageConfig(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ServiceError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_) | Self::Conflict(_))
    }
}

impl From<StorageError> for ServiceError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotConfigured(msg) => Self::StorageConfig(msg),
            StorageError::PreconditionFailed(msg) => Self::Conflict(msg),
            StorageError::Backend(msg) => Self::Storage(msg),
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_map_to_service_kinds() {
        let e: ServiceError = StorageError::NotConfigured("no key".into()).into();
        assert!(matches!(e, ServiceError::StorageConfig(_)));
        let e: ServiceError = StorageError::PreconditionFailed("etag".into()).into();
        assert!(matches!(e, ServiceError::Conflict(_)));
        assert!(e.is_client_error());
        let e: ServiceError = StorageError::Backend("boom".into()).into();
        assert_eq!(e.to_string(), "storage error: boom");
        assert!(!e.is_client_error());
    }
}
