//! S3-compatible storage adapter for a content-management host.
//!
//! [`S3Storage`] implements the host's storage contract ([`StorageAdapter`]):
//! `save`, `save_raw`, `exists`, `delete`, `read` and `serve`. Each call is
//! one request against an [`ObjectClient`]; `serve` returns an axum router
//! that streams stored files back over HTTP.
//!
//! # Object keys
//!
//! Keys always use `/` separators and never start with `/`. URLs returned by
//! `save` and `save_raw` are the key with a leading `/`.

pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use client::{ClientError, ClientErrorKind, MemoryObjectClient, ObjectClient, S3ObjectClient};
pub use config::{AppConfig, StorageConfig};
pub use models::{FileDescriptor, FileSource, ReadDescriptor};
pub use services::{NamingStrategy, S3Storage, SequentialNaming, StorageAdapter, StorageError};
