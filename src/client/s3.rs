//! `ObjectClient` backed by the AWS SDK, for AWS S3 and S3-compatible
//! services (MinIO, R2, Spaces, ...).

use crate::{
    client::{ClientError, ClientResult, ObjectClient},
    config::StorageConfig,
    models::{BodyStream, GetObjectOutput, ObjectMeta},
};
use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Credentials, Region, http::HttpResponse},
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    primitives::{ByteStream, DateTime as AwsDateTime},
};
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use tokio_util::io::ReaderStream;
use tracing::debug;

/// Thin wrapper so the trait methods don't collide with the SDK's own
/// `put_object()`/`get_object()` builders.
#[derive(Clone, Debug)]
pub struct S3ObjectClient {
    client: Client,
}

impl S3ObjectClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Build an SDK client from the resolved storage configuration.
///
/// Static credentials are used when both keys are configured; otherwise the
/// default provider chain (env, profile, IMDS) is consulted.
pub async fn build_s3_client(config: &StorageConfig) -> Client {
    let region = Region::new(config.region.clone());
    let mut builder = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(region.clone())
        .force_path_style(config.force_path_style);

    if let Some(endpoint) = config.endpoint_url() {
        debug!(endpoint = %endpoint, "using custom S3 endpoint");
        builder = builder.endpoint_url(endpoint);
    }

    if let (Some(access_key), Some(secret_key)) =
        (&config.access_key_id, &config.secret_access_key)
    {
        builder = builder.credentials_provider(static_credentials(access_key, secret_key));
    } else {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .load()
            .await;
        if let Some(provider) = sdk_config.credentials_provider() {
            builder = builder.credentials_provider(provider);
        }
    }

    Client::from_conf(builder.build())
}

fn static_credentials(access_key: &str, secret_key: &str) -> Credentials {
    Credentials::new(access_key, secret_key, None, None, "static")
}

impl ClientError {
    /// Tag an SDK failure with its not-found classification.
    fn from_sdk<E>(err: SdkError<E, HttpResponse>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    {
        let status = err.raw_response().map(|resp| resp.status().as_u16());
        let code = err.code().map(str::to_string);
        let message = DisplayErrorContext(&err).to_string();
        ClientError::classify(code.as_deref(), status, message)
    }
}

fn to_chrono(ts: &AwsDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
}

#[async_trait]
impl ObjectClient for S3ObjectClient {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> ClientResult<()> {
        let checksum = general_purpose::STANDARD.encode(md5::compute(&body).0);

        let mut req = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_md5(checksum)
            .content_length(body.len() as i64)
            .body(ByteStream::from(body));

        if let Some(content_type) = content_type {
            req = req.content_type(content_type);
        }

        req.send().await.map_err(ClientError::from_sdk)?;
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> ClientResult<GetObjectOutput> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(ClientError::from_sdk)?;

        let meta = ObjectMeta {
            content_type: output.content_type().map(str::to_string),
            etag: output.e_tag().map(str::to_string),
            last_modified: output.last_modified().and_then(to_chrono),
            content_length: output.content_length(),
        };

        let body: BodyStream = Box::pin(ReaderStream::new(output.body.into_async_read()).map(
            |chunk| chunk.map_err(|err| ClientError::other(format!("reading body: {}", err))),
        ));

        Ok(GetObjectOutput {
            meta,
            body: Some(body),
        })
    }

    async fn head_object(&self, bucket: &str, key: &str) -> ClientResult<ObjectMeta> {
        let output = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(ClientError::from_sdk)?;

        Ok(ObjectMeta {
            content_type: output.content_type().map(str::to_string),
            etag: output.e_tag().map(str::to_string),
            last_modified: output.last_modified().and_then(to_chrono),
            content_length: output.content_length(),
        })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> ClientResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(ClientError::from_sdk)?;
        Ok(())
    }

    async fn head_bucket(&self, bucket: &str) -> ClientResult<()> {
        self.client
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(ClientError::from_sdk)?;
        Ok(())
    }
}
