use anyhow::Result;
use axum::Router;
use std::{io::ErrorKind, path::Path, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;

use services::{
    gateway_service::Gateway,
    storage_backend::{FilesystemBackend, ObjectBackend},
};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config ---
    let cfg = config::AppConfig::from_env_and_args()?;

    tracing::info!("Starting asset-gateway with config: {:?}", cfg);

    // --- Storage backend ---
    // The gateway only reads, so a missing root is reported rather than created.
    if !Path::new(&cfg.storage_dir).is_dir() {
        tracing::warn!(
            "Storage directory {} does not exist; every request will miss until it does",
            cfg.storage_dir
        );
    }
    let backend: Arc<dyn ObjectBackend> = Arc::new(FilesystemBackend::new(&cfg.storage_dir));

    // --- Build gateway + router ---
    let gateway = Arc::new(Gateway::new(&cfg.gateway, backend));
    let app: Router = routes::routes::routes().with_state(gateway);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Gateway listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
