//! MerklGate - HTTP Add Service
//!
//! Accepts multipart uploads, builds their content DAG into S3 and pins the
//! resulting root.

mod config;
mod dto;
mod handlers;
mod routes;
mod source;
mod store;

use std::sync::Arc;

use anyhow::Result;
use merkl_dag::{LocalClusterDagService, MemoryDagService};
use merkl_s3::S3DagService;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{GateConfig, StoreKind};
use crate::store::NodeStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dag: Arc<LocalClusterDagService<NodeStore>>,
    /// Cancelled on shutdown; every add runs under it
    pub shutdown: CancellationToken,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting MerklGate add service");

    let config = GateConfig::from_env()?;

    let store = match config.store {
        StoreKind::S3 => {
            info!(bucket = %config.bucket, "Initializing S3 node store");
            NodeStore::S3(S3DagService::from_env(config.bucket.clone()).await)
        }
        StoreKind::Memory => {
            info!("Using in-memory node store");
            NodeStore::Memory(MemoryDagService::new())
        }
    };

    let shutdown = CancellationToken::new();
    let state = AppState {
        dag: Arc::new(LocalClusterDagService::new(store)),
        shutdown: shutdown.clone(),
    };

    // Build HTTP router
    let app = routes::create_router(state, config.max_upload_bytes());

    let addr = config.bind_addr();
    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested, cancelling running adds");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
