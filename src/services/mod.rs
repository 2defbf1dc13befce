pub mod keys;
pub mod naming;
pub mod s3_storage;

pub use naming::{NamingStrategy, SequentialNaming};
pub use s3_storage::{S3Storage, StorageAdapter, StorageError, StorageResult};
