use axum::{
    http::{header, Method, StatusCode},
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::resources::{BoardMembers, ImpactGoals, NamingOpportunities};

use crate::state::AppState;

pub mod auth;
pub mod collections;

use collections::ResourceState;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> (StatusCode, String) {
    let (code, body) = service::metrics::encode_metrics();
    (StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR), body)
}

/// `Access-Control-Allow-Origin: *` on every response; preflights answered
/// by the layer.
pub fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Build the full application router: collections, admin auth, health,
/// metrics and the optional static site.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let details = state.expose_error_details;
    let stores = &state.collections;

    let mut router = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(collections::router::<BoardMembers>(ResourceState::new(
            stores.board_members.clone(),
            details,
        )))
        .merge(collections::router::<ImpactGoals>(ResourceState::new(
            stores.impact_goals.clone(),
            details,
        )))
        .merge(collections::router::<NamingOpportunities>(ResourceState::new(
            stores.naming_opportunities.clone(),
            details,
        )))
        .merge(auth::router(state.admin_auth.clone()));

    if let Some(dir) = state.static_dir.as_deref() {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
