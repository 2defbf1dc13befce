//! src/services/s3_storage.rs
//!
//! S3Storage — the content-management storage contract (save, save_raw,
//! exists, delete, read, serve) mapped one-to-one onto object-store requests.
//! No state is kept here beyond the resolved config and a shared client; every
//! stored byte lives in the bucket.

use crate::{
    client::{ClientError, ClientResult, ObjectClient},
    config::StorageConfig,
    models::{FileDescriptor, GetObjectOutput, ReadDescriptor},
    routes,
    services::{
        keys,
        naming::{NamingStrategy, SequentialNaming},
    },
};
use async_trait::async_trait;
use axum::Router;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use std::{sync::Arc, time::Instant};
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to save file: {0}")]
    Save(String),
    #[error("failed to save raw file: {0}")]
    SaveRaw(String),
    #[error("failed to delete file: {0}")]
    Delete(String),
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("failed to read file: {0}")]
    Read(String),
    /// Unwrapped store failure, surfaced as-is by `exists`.
    #[error(transparent)]
    Client(#[from] ClientError),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// The storage contract a content-management host calls into.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Persist an uploaded file and return the URL path it is served under.
    async fn save(&self, file: &FileDescriptor, target_dir: Option<&str>) -> StorageResult<String>;

    /// Persist a raw buffer at `static prefix + target_path`.
    async fn save_raw(&self, buffer: Bytes, target_path: &str) -> StorageResult<String>;

    /// `Ok(false)` only when the store reports the key as missing.
    async fn exists(&self, file_name: &str, target_dir: Option<&str>) -> StorageResult<bool>;

    async fn delete(&self, file_name: &str, target_dir: Option<&str>) -> StorageResult<()>;

    /// Read a whole object into memory.
    async fn read(&self, descriptor: &ReadDescriptor) -> StorageResult<Bytes>;

    /// Request handler serving stored files, to be mounted by the host.
    fn serve(&self) -> Router;
}

/// S3-backed implementation of [`StorageAdapter`].
///
/// Cheap to clone; clones share the client, config and naming strategy.
#[derive(Clone)]
pub struct S3Storage {
    client: Arc<dyn ObjectClient>,
    config: Arc<StorageConfig>,
    naming: Arc<dyn NamingStrategy>,
}

impl S3Storage {
    /// Create an adapter over `client` using the default naming strategy.
    pub fn new(client: Arc<dyn ObjectClient>, config: StorageConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
            naming: Arc::new(SequentialNaming),
        }
    }

    /// Replace the collision-avoidance strategy.
    pub fn with_naming(mut self, naming: Arc<dyn NamingStrategy>) -> Self {
        self.naming = naming;
        self
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// Key of a static asset requested at `request_path`.
    pub fn static_key(&self, request_path: &str) -> String {
        keys::join(&self.config.static_file_url_prefix, request_path)
    }

    /// Directory new uploads go to. A configured storage path wins over the
    /// caller's hint.
    fn upload_dir(&self, target_dir: Option<&str>) -> String {
        let storage_path = self.config.storage_path.as_str();
        match target_dir.filter(|dir| !dir.is_empty()) {
            Some(dir) if storage_path.is_empty() => dir.to_string(),
            _ => self.naming.target_dir(storage_path),
        }
    }

    /// Issue the single read request behind a served asset.
    pub async fn get_static_object(&self, request_path: &str) -> ClientResult<GetObjectOutput> {
        let key = self.static_key(request_path);
        debug!(bucket = %self.bucket(), key = %key, "serving object");
        self.client.get_object(self.bucket(), &key).await
    }

    /// Probe the configured bucket; used by readiness checks.
    pub async fn check_bucket(&self) -> ClientResult<()> {
        self.client.head_bucket(self.bucket()).await
    }

    async fn put(&self, key: &str, body: Bytes, content_type: Option<&str>) -> ClientResult<()> {
        let size = body.len();
        let start = Instant::now();

        let result = self
            .client
            .put_object(self.bucket(), key, body, content_type)
            .await;

        match &result {
            Ok(()) => info!(
                bucket = %self.bucket(),
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload successful"
            ),
            Err(err) => error!(
                error = %err,
                bucket = %self.bucket(),
                key = %key,
                size_bytes = size,
                "S3 upload failed"
            ),
        }
        result
    }
}

#[async_trait]
impl StorageAdapter for S3Storage {
    async fn save(&self, file: &FileDescriptor, target_dir: Option<&str>) -> StorageResult<String> {
        let dir = self.upload_dir(target_dir);
        let unique = self
            .naming
            .unique_file_name(file, &dir, self)
            .await
            .map_err(|err| StorageError::Save(err.to_string()))?;
        let key = keys::object_key(&unique);

        let contents = file
            .contents()
            .await
            .map_err(|err| StorageError::Save(err.to_string()))?;

        self.put(&key, contents, file.content_type.as_deref())
            .await
            .map_err(|err| StorageError::Save(err.to_string()))?;

        Ok(keys::url_for(&key))
    }

    async fn save_raw(&self, buffer: Bytes, target_path: &str) -> StorageResult<String> {
        let key = self.static_key(target_path);

        self.put(&key, buffer, None)
            .await
            .map_err(|err| StorageError::SaveRaw(err.to_string()))?;

        Ok(keys::url_for(&key))
    }

    async fn exists(&self, file_name: &str, target_dir: Option<&str>) -> StorageResult<bool> {
        let key = keys::dir_key(file_name, target_dir);

        match self.client.head_object(self.bucket(), &key).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => {
                error!(error = %err, bucket = %self.bucket(), key = %key, "S3 head failed");
                Err(StorageError::Client(err))
            }
        }
    }

    async fn delete(&self, file_name: &str, target_dir: Option<&str>) -> StorageResult<()> {
        let key = keys::dir_key(file_name, target_dir);

        self.client
            .delete_object(self.bucket(), &key)
            .await
            .map_err(|err| {
                error!(error = %err, bucket = %self.bucket(), key = %key, "S3 delete failed");
                StorageError::Delete(err.to_string())
            })?;

        info!(bucket = %self.bucket(), key = %key, "S3 delete successful");
        Ok(())
    }

    async fn read(&self, descriptor: &ReadDescriptor) -> StorageResult<Bytes> {
        let key = keys::object_key(&descriptor.path);
        let start = Instant::now();

        let output = self
            .client
            .get_object(self.bucket(), &key)
            .await
            .map_err(|err| {
                if err.is_not_found() {
                    StorageError::NotFound(descriptor.path.clone())
                } else {
                    error!(error = %err, bucket = %self.bucket(), key = %key, "S3 download failed");
                    StorageError::Read(err.to_string())
                }
            })?;

        let mut buffer = BytesMut::new();
        if let Some(mut body) = output.body {
            while let Some(chunk) = body.next().await {
                let chunk = chunk.map_err(|err| StorageError::Read(err.to_string()))?;
                buffer.extend_from_slice(&chunk);
            }
        }

        info!(
            bucket = %self.bucket(),
            key = %key,
            size_bytes = buffer.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );
        Ok(buffer.freeze())
    }

    fn serve(&self) -> Router {
        routes::serve_routes(self.clone())
    }
}
