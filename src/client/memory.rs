//! In-process `ObjectClient` that keeps objects in a map.
//!
//! Used for local runs (`--in-memory`) and tests. Behaves like a single
//! always-present bucket namespace per name: missing keys report not-found,
//! deletes of missing keys succeed.

use crate::{
    client::{ClientError, ClientResult, ObjectClient},
    models::{BodyStream, GetObjectOutput, ObjectMeta},
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Clone, Debug)]
struct StoredObject {
    data: Bytes,
    content_type: Option<String>,
    etag: String,
    last_modified: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct MemoryObjectClient {
    objects: RwLock<HashMap<(String, String), StoredObject>>,
    /// Body chunk size for reads; 0 means a single chunk.
    chunk_size: usize,
}

impl MemoryObjectClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split read bodies into chunks of `chunk_size` bytes.
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            ..Self::default()
        }
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    fn meta(object: &StoredObject) -> ObjectMeta {
        ObjectMeta {
            content_type: object.content_type.clone(),
            etag: Some(object.etag.clone()),
            last_modified: Some(object.last_modified),
            content_length: Some(object.data.len() as i64),
        }
    }

    fn missing(bucket: &str, key: &str) -> ClientError {
        ClientError::classify(
            Some("NoSuchKey"),
            Some(404),
            format!("object `{}` not found in bucket `{}`", key, bucket),
        )
    }

    fn chunks(&self, data: &Bytes) -> Vec<ClientResult<Bytes>> {
        if self.chunk_size == 0 || data.is_empty() {
            return vec![Ok(data.clone())];
        }
        let mut out = Vec::with_capacity(data.len().div_ceil(self.chunk_size));
        let mut offset = 0;
        while offset < data.len() {
            let end = (offset + self.chunk_size).min(data.len());
            out.push(Ok(data.slice(offset..end)));
            offset = end;
        }
        out
    }
}

#[async_trait]
impl ObjectClient for MemoryObjectClient {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> ClientResult<()> {
        let etag = format!("\"{:x}\"", md5::compute(&body));
        let object = StoredObject {
            data: body,
            content_type: content_type.map(str::to_string),
            etag,
            last_modified: Utc::now(),
        };
        self.objects
            .write()
            .await
            .insert((bucket.to_string(), key.to_string()), object);
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> ClientResult<GetObjectOutput> {
        let objects = self.objects.read().await;
        let object = objects
            .get(&(bucket.to_string(), key.to_string()))
            .ok_or_else(|| Self::missing(bucket, key))?;

        let body: BodyStream = Box::pin(futures::stream::iter(self.chunks(&object.data)));
        Ok(GetObjectOutput {
            meta: Self::meta(object),
            body: Some(body),
        })
    }

    async fn head_object(&self, bucket: &str, key: &str) -> ClientResult<ObjectMeta> {
        let objects = self.objects.read().await;
        objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(Self::meta)
            .ok_or_else(|| Self::missing(bucket, key))
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> ClientResult<()> {
        self.objects
            .write()
            .await
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }

    async fn head_bucket(&self, _bucket: &str) -> ClientResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn put_then_head_reports_md5_etag() {
        let client = MemoryObjectClient::new();
        client
            .put_object("content", "a.txt", Bytes::from_static(b"hi"), Some("text/plain"))
            .await
            .unwrap();

        let meta = client.head_object("content", "a.txt").await.unwrap();
        assert_eq!(meta.content_type.as_deref(), Some("text/plain"));
        assert_eq!(meta.etag.as_deref(), Some("\"49f68a5c8493ec2c0bf489821c21fc3b\""));
        assert_eq!(meta.content_length, Some(2));
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let client = MemoryObjectClient::new();
        let err = client.get_object("content", "nope").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(client.head_object("content", "nope").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn reads_in_configured_chunks() {
        let client = MemoryObjectClient::with_chunk_size(3);
        client
            .put_object("content", "k", Bytes::from_static(b"abcdefgh"), None)
            .await
            .unwrap();

        let output = client.get_object("content", "k").await.unwrap();
        let chunks: Vec<Bytes> = output
            .body
            .unwrap()
            .map(|chunk| chunk.unwrap())
            .collect()
            .await;
        assert_eq!(chunks, vec!["abc", "def", "gh"]);
    }

    #[tokio::test]
    async fn delete_of_missing_key_succeeds() {
        let client = MemoryObjectClient::new();
        client.delete_object("content", "never-written").await.unwrap();
        assert!(client.is_empty().await);
    }
}
