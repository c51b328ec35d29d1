use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::{AppConfig, StorageBackend};
use tracing::info;

use crate::routes;
use crate::state::AppState;
use service::{admin_auth::AdminAuth, runtime};

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Wire storage, collection stores and auth from config into the app state.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let data_dir = (cfg.storage.backend == StorageBackend::File).then_some(cfg.storage.data_dir.as_str());
    common::env::ensure_env(cfg.server.static_dir.as_deref(), data_dir).await?;

    let blobs = runtime::build_blob_store(&cfg.storage).await?;
    Ok(AppState {
        collections: runtime::Collections::new(blobs, &cfg.storage),
        admin_auth: Arc::new(AdminAuth::new(&cfg.auth.admin_password)),
        expose_error_details: cfg.is_development(),
        static_dir: cfg.server.static_dir.clone(),
    })
}

/// Public entry: build the app from a loaded config and run the HTTP server.
/// Logging is initialised by the caller, from `cfg.server.log_format`.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg).await?;
    let app: Router = routes::build_router(state, routes::build_cors());

    let addr = bind_addr(&cfg)?;
    info!(%addr, environment = %cfg.server.environment, "starting site api");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
