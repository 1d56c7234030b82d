//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
///
/// Every variant carries the bucket and key so a failed stage can name
/// exactly which object it could not reach.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed for {bucket}/{key}: {message}")]
    UploadFailed {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("Presign failed for {bucket}/{key}: {message}")]
    PresignFailed {
        bucket: String,
        key: String,
        message: String,
    },
}

impl StorageError {
    pub fn upload_failed(
        bucket: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::UploadFailed {
            bucket: bucket.into(),
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn presign_failed(
        bucket: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::PresignFailed {
            bucket: bucket.into(),
            key: key.into(),
            message: message.into(),
        }
    }
}
