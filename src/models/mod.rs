//! Core data models passed between the host, the adapter and the object store.
//!
//! Nothing here is persisted locally; every stored object lives in the bucket.

pub mod file;
pub mod object;

pub use file::{FileDescriptor, FileSource, ReadDescriptor};
pub use object::{BodyStream, GetObjectOutput, ObjectMeta};
