//! Generic CRUD handlers, instantiated once per resource.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};
use service::collection::{BlobCollectionStore, Resource};
use service::errors::ServiceError;
use tracing::debug;

use crate::errors::{method_not_allowed, JsonApiError};

pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

pub struct ResourceState<R: Resource> {
    pub store: Arc<BlobCollectionStore<R>>,
    pub expose_error_details: bool,
}

impl<R: Resource> Clone for ResourceState<R> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), expose_error_details: self.expose_error_details }
    }
}

impl<R: Resource> ResourceState<R> {
    pub fn new(store: Arc<BlobCollectionStore<R>>, expose_error_details: bool) -> Self {
        Self { store, expose_error_details }
    }

    fn error(&self, e: ServiceError) -> JsonApiError {
        JsonApiError::from_service(e, self.expose_error_details)
    }
}

#[derive(Serialize)]
pub struct Deleted<T> {
    pub message: &'static str,
    pub deleted: T,
}

/// Lenient body parsing: a missing, malformed or mistyped body becomes the
/// empty input, which then fails required-field validation with a 400.
pub fn parse_input<T: DeserializeOwned + Default>(body: &[u8]) -> T {
    if body.iter().all(u8::is_ascii_whitespace) {
        return T::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        debug!(error = %e, "request body is not a usable JSON object");
        T::default()
    })
}

pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS),
        ],
    )
}

async fn list<R: Resource>(
    State(state): State<ResourceState<R>>,
) -> Result<Json<Vec<R::Record>>, JsonApiError> {
    state.store.list().await.map(Json).map_err(|e| state.error(e))
}

async fn get_one<R: Resource>(
    State(state): State<ResourceState<R>>,
    Path(id): Path<String>,
) -> Result<Json<R::Record>, JsonApiError> {
    state.store.get(&id).await.map(Json).map_err(|e| state.error(e))
}

async fn create<R: Resource>(
    State(state): State<ResourceState<R>>,
    body: Bytes,
) -> Result<(StatusCode, Json<R::Record>), JsonApiError> {
    let input = parse_input::<R::Input>(&body);
    let created = state.store.create(input).await.map_err(|e| state.error(e))?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update<R: Resource>(
    State(state): State<ResourceState<R>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<R::Record>, JsonApiError> {
    let input = parse_input::<R::Input>(&body);
    state.store.update(Some(&id), input).await.map(Json).map_err(|e| state.error(e))
}

async fn update_without_id<R: Resource>(
    State(state): State<ResourceState<R>>,
    body: Bytes,
) -> Result<Json<R::Record>, JsonApiError> {
    let input = parse_input::<R::Input>(&body);
    state.store.update(None, input).await.map(Json).map_err(|e| state.error(e))
}

async fn remove<R: Resource>(
    State(state): State<ResourceState<R>>,
    Path(id): Path<String>,
) -> Result<Json<Deleted<R::Record>>, JsonApiError> {
    let deleted = state.store.remove(Some(&id)).await.map_err(|e| state.error(e))?;
    Ok(Json(Deleted { message: R::LABELS.deleted, deleted }))
}

async fn remove_without_id<R: Resource>(
    State(state): State<ResourceState<R>>,
) -> Result<Json<Deleted<R::Record>>, JsonApiError> {
    let deleted = state.store.remove(None).await.map_err(|e| state.error(e))?;
    Ok(Json(Deleted { message: R::LABELS.deleted, deleted }))
}

/// `/api/<resource>` and `/api/<resource>/:id` for one collection.
pub fn router<R: Resource>(state: ResourceState<R>) -> Router {
    let base = format!("/api/{}", R::LABELS.name);
    let item = format!("{base}/:id");

    let collection_routes = get(list::<R>)
        .post(create::<R>)
        .put(update_without_id::<R>)
        .delete(remove_without_id::<R>)
        .options(preflight)
        .fallback(method_not_allowed);
    let item_routes = get(get_one::<R>)
        .put(update::<R>)
        .delete(remove::<R>)
        .options(preflight)
        .fallback(method_not_allowed);

    Router::new()
        .route(&base, collection_routes)
        .route(&item, item_routes)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use service::resources::BoardMemberInput;

    #[test]
    fn lenient_body_parsing() {
        let empty: BoardMemberInput = parse_input(b"  ");
        assert!(empty.name.is_none());
        let garbage: BoardMemberInput = parse_input(b"name=Ada");
        assert!(garbage.name.is_none());
        let mistyped: BoardMemberInput = parse_input(br#"{"name": 5, "title": "Chair"}"#);
        assert!(mistyped.title.is_none());
        let ok: BoardMemberInput = parse_input(br#"{"name": "Ada", "title": "Chair", "extra": 1}"#);
        assert_eq!(ok.name.as_deref(), Some("Ada"));
    }
}
