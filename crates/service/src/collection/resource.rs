use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};

use super::ids::RecordId;
use crate::errors::ServiceError;

/// User-facing messages and names for one resource.
#[derive(Debug, Clone, Copy)]
pub struct ResourceLabels {
    /// Route segment, also used as the metrics/log label.
    pub name: &'static str,
    pub fields_required: &'static str,
    pub id_required: &'static str,
    pub not_found: &'static str,
    pub collection_missing: &'static str,
    pub deleted: &'static str,
    pub conflict: &'static str,
}

/// Field shape and policies of one JSON collection.
///
/// A resource turns a request body (`Input`) into validated `Fields`, and
/// fields into stored records, either fresh (`create`) or on top of an
/// existing record (`update`).
pub trait Resource: Send + Sync + 'static {
    type Record: Serialize + DeserializeOwned + Clone + Debug + Send + Sync;
    type Input: DeserializeOwned + Default + Debug + Send;
    type Fields: Send;

    const LABELS: ResourceLabels;

    /// Prefix of legacy string ids, e.g. `member-`.
    const ID_PREFIX: Option<&'static str> = None;

    fn id(record: &Self::Record) -> &RecordId;

    /// Check required fields and trim them.
    fn validate(input: Self::Input) -> Result<Self::Fields, ServiceError>;

    fn create(id: i64, fields: Self::Fields) -> Self::Record;

    fn update(id: i64, existing: &Self::Record, fields: Self::Fields) -> Self::Record;

    /// Collection persisted and returned the first time an absent blob is read.
    fn seed() -> Option<Vec<Self::Record>> {
        None
    }

    /// Read-time ordering for unfiltered listings. Never persisted.
    fn order_for_listing(_records: &mut [Self::Record]) {}
}

/// Trimmed value of a required string field, `None` when missing or blank.
pub fn required(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Both required fields, or the resource's validation error.
pub fn require_pair<R: Resource>(
    first: Option<String>,
    second: Option<String>,
) -> Result<(String, String), ServiceError> {
    match (required(first), required(second)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(ServiceError::Validation(R::LABELS.fields_required.into())),
    }
}
