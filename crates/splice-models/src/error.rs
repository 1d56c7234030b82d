//! Errors for partitioning and reassembly.

use thiserror::Error;

/// Errors produced while building a partition plan or reordering results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// Segment length must be positive.
    #[error("invalid segment_time {0}: must be greater than zero")]
    InvalidSegmentTime(f64),

    /// Fan-out width must be positive.
    #[error("invalid group_count {0}: must be greater than zero")]
    InvalidGroupCount(u32),

    /// A video stream was found but neither it nor the container reports a duration.
    #[error("video stream reports no duration")]
    MissingDuration,

    /// Two results claim the same timeline position.
    #[error("duplicate order_index {0} in grouped results")]
    DuplicateOrderIndex(u32),

    /// A timeline position is missing from the collected results.
    #[error("grouped results are not contiguous: expected order_index {expected}, found {found}")]
    OrderIndexGap {
        /// The order index that should have come next
        expected: u32,
        /// The order index actually found
        found: u32,
    },
}

/// Result type for model operations.
pub type PlanResult<T> = Result<T, PlanError>;
