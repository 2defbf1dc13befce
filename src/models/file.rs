//! Inputs handed to the adapter by the content-management host.

use bytes::Bytes;
use std::path::{Path, PathBuf};

/// Where the content of an uploaded file lives.
#[derive(Clone, Debug)]
pub enum FileSource {
    /// Content already held in memory.
    Bytes(Bytes),
    /// Content staged on local disk (e.g. a multipart upload temp file).
    Path(PathBuf),
}

/// A file the host wants persisted through `save`.
#[derive(Clone, Debug)]
pub struct FileDescriptor {
    /// Original filename as uploaded, used to derive the stored name.
    pub name: String,

    /// Declared content type (MIME type).
    pub content_type: Option<String>,

    pub source: FileSource,
}

impl FileDescriptor {
    pub fn from_bytes(
        name: impl Into<String>,
        content_type: Option<&str>,
        contents: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.map(str::to_string),
            source: FileSource::Bytes(contents.into()),
        }
    }

    pub fn from_path(
        name: impl Into<String>,
        content_type: Option<&str>,
        path: impl AsRef<Path>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.map(str::to_string),
            source: FileSource::Path(path.as_ref().to_path_buf()),
        }
    }

    /// Load the file content into memory.
    pub async fn contents(&self) -> std::io::Result<Bytes> {
        match &self.source {
            FileSource::Bytes(bytes) => Ok(bytes.clone()),
            FileSource::Path(path) => tokio::fs::read(path).await.map(Bytes::from),
        }
    }
}

/// Identifies an object to read back; `path` is an already-resolved key or
/// the URL path returned by `save`.
#[derive(Clone, Debug)]
pub struct ReadDescriptor {
    pub path: String,
}

impl ReadDescriptor {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}
