//! Represents an object (file) as reported back by the object store.

use crate::client::ClientError;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use std::{fmt, pin::Pin};

/// Incremental body of a stored object.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, ClientError>> + Send>>;

/// Metadata the store returns alongside an object.
///
/// Every field is optional: S3-compatible services differ in what they echo
/// back, and the serve path only copies the fields that are present.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectMeta {
    /// Content type (MIME type) recorded at write time.
    pub content_type: Option<String>,

    /// Entity tag exactly as the store reports it (usually already quoted).
    pub etag: Option<String>,

    /// Timestamp when the object was last written.
    pub last_modified: Option<DateTime<Utc>>,

    /// Size in bytes.
    pub content_length: Option<i64>,
}

/// Result of a successful read request.
pub struct GetObjectOutput {
    pub meta: ObjectMeta,

    /// `None` when the store answered without any content.
    pub body: Option<BodyStream>,
}

impl fmt::Debug for GetObjectOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetObjectOutput")
            .field("meta", &self.meta)
            .field("body", &self.body.as_ref().map(|_| "<stream>"))
            .finish()
    }
}
