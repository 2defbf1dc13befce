//! Defines routes for serving stored files and the host's probes.
//!
//! ## Structure
//! - **Serve handler** (`serve_routes`): every GET path is looked up under the
//!   configured static prefix. Hosts nest or merge it wherever they want.
//! - **Host application** (`app`)
//!   - `GET /healthz` — liveness
//!   - `GET /readyz`  — bucket reachability
//!   - `GET /{static_file_url_prefix}/{*path}` — stored files

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        serve_handlers::serve_object,
    },
    services::{
        keys,
        s3_storage::{S3Storage, StorageAdapter},
    },
};
use axum::{Router, routing::get};

/// The reusable serve handler, bound to one adapter.
pub fn serve_routes(storage: S3Storage) -> Router {
    Router::new()
        .fallback(get(serve_object))
        .with_state(storage)
}

/// Build the host router: probes at the root, stored files under the static
/// prefix.
pub fn app(storage: S3Storage) -> Router {
    let probes = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .with_state(storage.clone());

    let mount = keys::object_key(&storage.config().static_file_url_prefix);
    let mount = mount.trim_end_matches('/');
    if mount.is_empty() {
        probes.merge(storage.serve())
    } else {
        probes.nest_service(&format!("/{}", mount), storage.serve())
    }
}
