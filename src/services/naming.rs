//! File naming collaborator injected into the storage adapter.
//!
//! The adapter delegates two decisions: which directory a new upload goes to,
//! and which name inside that directory is still free.

use crate::{
    models::FileDescriptor,
    services::{
        keys,
        s3_storage::{StorageAdapter, StorageError, StorageResult},
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Suffixes tried before `SequentialNaming` gives up on a name.
pub(crate) const MAX_NAME_ATTEMPTS: u32 = 100;

#[async_trait]
pub trait NamingStrategy: Send + Sync {
    /// Directory under `base_dir` where new uploads are placed.
    fn target_dir(&self, base_dir: &str) -> String;

    /// A path (`target_dir/name`) that does not collide with an existing
    /// object. `storage` is used to probe for existing names.
    async fn unique_file_name(
        &self,
        file: &FileDescriptor,
        target_dir: &str,
        storage: &dyn StorageAdapter,
    ) -> StorageResult<String>;
}

/// Date-bucketed directories (`base/YYYY/MM`) and `name`, `name-1`,
/// `name-2`, ... suffixes until a free name is found.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialNaming;

#[async_trait]
impl NamingStrategy for SequentialNaming {
    fn target_dir(&self, base_dir: &str) -> String {
        dated_dir(base_dir, Utc::now())
    }

    async fn unique_file_name(
        &self,
        file: &FileDescriptor,
        target_dir: &str,
        storage: &dyn StorageAdapter,
    ) -> StorageResult<String> {
        let (stem, ext) = split_name(&file.name);
        let stem = sanitize(stem);
        if stem.trim_matches('.').is_empty() && ext.is_empty() {
            return Err(StorageError::Save(format!(
                "empty file name `{}`",
                file.name
            )));
        }

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = if attempt == 0 {
                format!("{}{}", stem, ext)
            } else {
                format!("{}-{}{}", stem, attempt, ext)
            };

            if !storage.exists(&candidate, Some(target_dir)).await? {
                return Ok(keys::join(target_dir, &candidate));
            }
        }

        Err(StorageError::Save(format!(
            "no free name for `{}` in `{}` after {} attempts",
            file.name, target_dir, MAX_NAME_ATTEMPTS
        )))
    }
}

pub(crate) fn dated_dir(base_dir: &str, now: DateTime<Utc>) -> String {
    let dated = now.format("%Y/%m").to_string();
    let base = keys::normalize_separators(base_dir);
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        dated
    } else {
        format!("{}/{}", base, dated)
    }
}

/// Split a file name into stem and extension (with its dot).
/// Directory components of the original name are dropped.
fn split_name(name: &str) -> (&str, String) {
    let normalized = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let path = Path::new(normalized);
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();
    let stem = &normalized[..normalized.len() - ext.len()];
    (stem, ext)
}

/// Replace anything outside `[A-Za-z0-9_@.]` with `-`.
fn sanitize(stem: &str) -> String {
    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '@' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect()
}
