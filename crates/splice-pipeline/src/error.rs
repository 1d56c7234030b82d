//! Stage error types.

use thiserror::Error;

use splice_media::MediaError;
use splice_models::{JobId, PlanError};
use splice_storage::StorageError;

pub type StageResult<T> = Result<T, StageError>;

/// Errors surfaced at the stage boundary.
///
/// Each stage is the external orchestrator's unit of retry, so failures
/// carry enough context (job, order index) to re-invoke just the failed
/// unit of work.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("invalid stage input: {0}")]
    InvalidInput(String),

    #[error("planning failed: {0}")]
    Plan(#[from] PlanError),

    #[error("probe failed for job {job_id}: {source}")]
    Probe {
        job_id: JobId,
        #[source]
        source: MediaError,
    },

    #[error("transcode failed for job {job_id} segment {order_index}: {source}")]
    Transcode {
        job_id: JobId,
        order_index: u32,
        #[source]
        source: MediaError,
    },

    #[error("media error: {0}")]
    Media(#[from] MediaError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StageError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Check if the orchestrator may retry the stage as-is.
    ///
    /// Tool and storage failures are transient; contract violations and
    /// malformed inputs will fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StageError::Probe { .. }
                | StageError::Transcode { .. }
                | StageError::Media(_)
                | StageError::Storage(_)
                | StageError::Io(_)
        )
    }
}
