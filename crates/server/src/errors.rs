use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use service::errors::ServiceError;
use tracing::{debug, error};

/// JSON error response: `{"error": "..."}` plus optional extra fields.
#[derive(Debug)]
pub struct JsonApiError {
    status: StatusCode,
    body: Value,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, body: json!({ "error": message.into() }) }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Map a service error to its HTTP shape. Internal failures get a generic
    /// message; `expose_details` (development mode) adds the error text.
    pub fn from_service(e: ServiceError, expose_details: bool) -> Self {
        if e.is_client_error() {
            debug!(error = %e, "request rejected");
        } else {
            error!(error = %e, "request failed");
        }
        match e {
            ServiceError::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            ServiceError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, msg),
            ServiceError::Conflict(msg) => Self::new(StatusCode::CONFLICT, msg),
            ServiceError::StorageConfig(msg) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg),
            other => {
                let mut err = Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
                if expose_details {
                    err.body["details"] = Value::String(other.to_string());
                }
                err
            }
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub async fn method_not_allowed() -> JsonApiError {
    JsonApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}
