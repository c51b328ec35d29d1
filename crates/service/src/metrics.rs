use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static BLOB_DOWNLOADS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "site_api_blob_downloads_total",
        "Collection blob downloads",
        &["resource"]
    )
    .expect("register blob_downloads_total")
});

pub static BLOB_UPLOADS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "site_api_blob_uploads_total",
        "Collection blob uploads (full overwrites)",
        &["resource"]
    )
    .expect("register blob_uploads_total")
});

pub static WRITE_CONFLICTS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "site_api_write_conflicts_total",
        "Uploads rejected because the blob changed after it was read",
        &["resource"]
    )
    .expect("register write_conflicts_total")
});

pub static COLLECTION_OPS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "site_api_collection_operations_total",
        "Collection operations by resource and operation",
        &["resource", "op"]
    )
    .expect("register collection_operations_total")
});

pub fn record_op(resource: &str, op: &str) {
    COLLECTION_OPS.with_label_values(&[resource, op]).inc();
}

pub fn encode_metrics() -> (u16, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (500, format!("metrics encode error: {e}"));
    }
    (200, String::from_utf8(buffer).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_ops_show_up_in_text_output() {
        record_op("metrics-test", "list");
        let (status, body) = encode_metrics();
        assert_eq!(status, 200);
        assert!(body.contains("site_api_collection_operations_total"));
        assert!(body.contains("metrics-test"));
    }
}
