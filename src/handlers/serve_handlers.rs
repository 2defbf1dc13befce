//! Serves stored files back over HTTP.
//! Streams object bodies to avoid buffering in memory; the store is asked
//! exactly once per request and nothing is retried.

use crate::{
    errors::AppError,
    models::{GetObjectOutput, ObjectMeta},
    services::s3_storage::S3Storage,
};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

/// Served files are immutable once written, so caches may keep them a year.
pub const CACHE_CONTROL: &str = "public, max-age=31536000";

const NOT_FOUND_BODY: &str = "File not found";

/// GET handler for static assets. The object key is the configured static
/// prefix joined with the request path.
///
/// Store failures other than not-found are handed to the host's error
/// pathway instead of being rendered here.
pub async fn serve_object(
    State(storage): State<S3Storage>,
    uri: Uri,
) -> Result<Response, AppError> {
    match storage.get_static_object(uri.path()).await {
        Ok(GetObjectOutput {
            meta,
            body: Some(body),
        }) => {
            // The response body owns the upstream stream and drops it on
            // completion, client disconnect or error alike.
            let mut response = Response::new(Body::from_stream(body));
            set_object_headers(response.headers_mut(), &meta);
            Ok(response)
        }
        Ok(GetObjectOutput { body: None, .. }) => {
            debug!(path = %uri.path(), "store returned no body");
            Ok(not_found())
        }
        Err(err) if err.is_not_found() => {
            debug!(path = %uri.path(), "object not found");
            Ok(not_found())
        }
        Err(err) => {
            error!(error = %err, path = %uri.path(), "failed to serve object");
            Err(err.into())
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response()
}

fn set_object_headers(headers: &mut HeaderMap, meta: &ObjectMeta) {
    if let Some(content_type) = meta.content_type.as_deref() {
        if let Ok(value) = HeaderValue::from_str(content_type) {
            headers.insert(header::CONTENT_TYPE, value);
        }
    }

    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL));

    if let Some(etag) = meta.etag.as_deref() {
        if let Ok(value) = HeaderValue::from_str(etag) {
            headers.insert(header::ETAG, value);
        }
    }

    if let Some(last_modified) = meta.last_modified {
        let http_date = last_modified
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string();
        if let Ok(value) = HeaderValue::from_str(&http_date) {
            headers.insert(header::LAST_MODIFIED, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::{
            ClientError,
            testing::{GetScript, ScriptedClient},
        },
        config::StorageConfig,
        services::s3_storage::StorageAdapter,
    };
    use axum::{body::to_bytes, http::Request};
    use bytes::Bytes;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn handler_for(script: GetScript) -> (Arc<ScriptedClient>, axum::Router) {
        let client = Arc::new(ScriptedClient::default().get(script));
        let storage = S3Storage::new(client.clone(), StorageConfig::default());
        (client, storage.serve())
    }

    async fn get(router: axum::Router, path: &str) -> Response {
        router
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn copies_metadata_headers_and_streams_body() {
        let meta = ObjectMeta {
            content_type: Some("image/jpeg".into()),
            etag: Some("\"x\"".into()),
            last_modified: Some(Utc.with_ymd_and_hms(2026, 10, 18, 8, 30, 0).unwrap()),
            content_length: Some(6),
        };
        let chunks = vec![Ok(Bytes::from_static(b"jpe")), Ok(Bytes::from_static(b"g!!"))];
        let (client, router) = handler_for(GetScript::Chunks(meta, chunks));

        let response = get(router, "/photo.jpg").await;
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "image/jpeg");
        assert_eq!(headers[header::CACHE_CONTROL], CACHE_CONTROL);
        assert_eq!(headers[header::ETAG], "\"x\"");
        assert_eq!(headers[header::LAST_MODIFIED], "Sun, 18 Oct 2026 08:30:00 GMT");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"jpeg!!");

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].key, "content/images/photo.jpg");
    }

    #[tokio::test]
    async fn skips_absent_metadata_fields() {
        let chunks = vec![Ok(Bytes::from_static(b"raw"))];
        let (_, router) = handler_for(GetScript::Chunks(ObjectMeta::default(), chunks));

        let response = get(router, "/blob").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::ETAG).is_none());
        assert!(response.headers().get(header::LAST_MODIFIED).is_none());
        assert_eq!(response.headers()[header::CACHE_CONTROL], CACHE_CONTROL);
    }

    #[tokio::test]
    async fn absent_body_is_plain_404_without_object_headers() {
        let meta = ObjectMeta {
            content_type: Some("image/jpeg".into()),
            etag: Some("\"x\"".into()),
            ..ObjectMeta::default()
        };
        let (_, router) = handler_for(GetScript::NoBody(meta));

        let response = get(router, "/photo.jpg").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::ETAG).is_none());
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());
        assert!(response.headers().get(header::LAST_MODIFIED).is_none());

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"File not found");
    }

    #[tokio::test]
    async fn not_found_error_is_plain_404() {
        let err = ClientError::classify(Some("NoSuchKey"), None, "The specified key does not exist.");
        let (_, router) = handler_for(GetScript::Fail(err));

        let response = get(router, "/gone.jpg").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"File not found");
    }

    #[tokio::test]
    async fn other_errors_go_to_host_error_pathway() {
        let err = ClientError::classify(Some("InternalError"), Some(500), "backend exploded");
        let client = Arc::new(ScriptedClient::default().get(GetScript::Fail(err)));
        let storage = S3Storage::new(client, StorageConfig::default());

        let result = serve_object(State(storage), Uri::from_static("/photo.jpg")).await;
        let app_err = result.unwrap_err();
        assert_eq!(app_err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(app_err.message, "backend exploded");
    }
}
