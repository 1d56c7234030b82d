//! Shared data models for the splice pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs and the caller-facing job request contract
//! - Probed video metadata
//! - Timeline partitioning (plans, groups, segment descriptors)
//! - Per-segment transcode results and their fan-in grouping
//! - HLS manifest assembly

pub mod error;
pub mod job;
pub mod manifest;
pub mod partition;
pub mod result;
pub mod video;

// Re-export common types
pub use error::{PlanError, PlanResult};
pub use job::{Job, JobId, JobRequest};
pub use manifest::{
    manifest_file_name, AssembleRequest, AssembleSummary, Manifest, NOMINAL_SEGMENT_DURATION,
    TARGET_DURATION,
};
pub use partition::{PartitionPlan, SegmentDescriptor, SegmentGroup, SegmentWorkItem};
pub use result::{artifact_name, GroupedResults, SegmentResult};
pub use video::{StreamDescriptor, VideoDescriptor};
