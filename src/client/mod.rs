//! Object-storage client seam.
//!
//! `ObjectClient` is the only place the adapter talks to the remote store.
//! Raw SDK errors are translated into [`ClientError`] right where they are
//! received, so nothing downstream ever looks at SDK error fields again.

use crate::models::{GetObjectOutput, ObjectMeta};
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod memory;
pub mod s3;
#[cfg(test)]
pub(crate) mod testing;

pub use memory::MemoryObjectClient;
pub use s3::{S3ObjectClient, build_s3_client};

/// Error codes S3-compatible services use for a missing key.
const NOT_FOUND_CODES: [&str; 2] = ["NotFound", "NoSuchKey"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientErrorKind {
    NotFound,
    Other,
}

/// A failed object-store request, already classified.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ClientError {
    pub kind: ClientErrorKind,
    /// Service error code (e.g. `NoSuchKey`), when the store sent one.
    pub code: Option<String>,
    /// HTTP status of the raw response, when one was received.
    pub status: Option<u16>,
    pub message: String,
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Classify a raw failure by its error code and HTTP status.
    ///
    /// A failure is "not found" when the code names a missing key or the
    /// response status is 404; everything else is `Other`.
    pub fn classify(code: Option<&str>, status: Option<u16>, message: impl Into<String>) -> Self {
        let not_found = status == Some(404)
            || code.is_some_and(|code| NOT_FOUND_CODES.contains(&code));

        Self {
            kind: if not_found {
                ClientErrorKind::NotFound
            } else {
                ClientErrorKind::Other
            },
            code: code.map(str::to_string),
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::classify(Some("NotFound"), Some(404), message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::classify(None, None, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ClientErrorKind::NotFound
    }
}

/// The four object requests the adapter issues, plus a bucket probe used by
/// readiness checks.
#[async_trait]
pub trait ObjectClient: Send + Sync {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> ClientResult<()>;

    async fn get_object(&self, bucket: &str, key: &str) -> ClientResult<GetObjectOutput>;

    async fn head_object(&self, bucket: &str, key: &str) -> ClientResult<ObjectMeta>;

    async fn delete_object(&self, bucket: &str, key: &str) -> ClientResult<()>;

    async fn head_bucket(&self, bucket: &str) -> ClientResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_missing_key_codes_as_not_found() {
        assert!(ClientError::classify(Some("NoSuchKey"), Some(404), "gone").is_not_found());
        assert!(ClientError::classify(Some("NotFound"), None, "gone").is_not_found());
    }

    #[test]
    fn classifies_bare_404_status_as_not_found() {
        let err = ClientError::classify(None, Some(404), "head failed");
        assert_eq!(err.kind, ClientErrorKind::NotFound);
        assert_eq!(err.status, Some(404));
    }

    #[test]
    fn other_failures_stay_other() {
        let denied = ClientError::classify(Some("AccessDenied"), Some(403), "denied");
        assert_eq!(denied.kind, ClientErrorKind::Other);
        assert_eq!(denied.code.as_deref(), Some("AccessDenied"));

        let dispatch = ClientError::classify(None, None, "connection refused");
        assert!(!dispatch.is_not_found());
        assert_eq!(dispatch.to_string(), "connection refused");
    }
}
