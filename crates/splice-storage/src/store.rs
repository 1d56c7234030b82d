//! Object store capability.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use crate::error::StorageResult;

/// Capability to hand out presigned source URLs and persist artifacts.
///
/// Buckets are per-call parameters: the pipeline reads its source from
/// one bucket and writes artifacts to another. Addressing style and
/// region are fixed at client construction, never per call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Presign a time-limited GET URL for an object.
    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Upload a local file.
    async fn upload_file(
        &self,
        path: &Path,
        bucket: &str,
        key: &str,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Upload an in-memory document.
    async fn upload_bytes(
        &self,
        data: Vec<u8>,
        bucket: &str,
        key: &str,
        content_type: &str,
    ) -> StorageResult<()>;
}
