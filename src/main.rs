use anyhow::Result;
use axum::Router;
use s3_content_store::{
    client::{MemoryObjectClient, ObjectClient, S3ObjectClient, build_s3_client},
    config::AppConfig,
    routes,
    services::S3Storage,
};
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config ---
    let cfg = AppConfig::from_env_and_args()?;

    tracing::info!("Starting s3-content-store with config: {:?}", cfg);

    // --- Initialize object store client ---
    let client: Arc<dyn ObjectClient> = if cfg.in_memory {
        tracing::warn!("Using in-memory object store; uploads are lost on exit");
        Arc::new(MemoryObjectClient::new())
    } else {
        if cfg.storage.access_key_id.is_none() || cfg.storage.secret_access_key.is_none() {
            tracing::info!("No static credentials configured, using default credential chain");
        }
        Arc::new(S3ObjectClient::new(build_s3_client(&cfg.storage).await))
    };

    // --- Initialize adapter ---
    let storage = S3Storage::new(client, cfg.storage.clone());

    // --- Build router ---
    let app: Router = routes::app(storage);

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

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
