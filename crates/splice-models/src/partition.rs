//! Timeline partitioning.
//!
//! Turns a probed video duration into a deterministic set of segment
//! descriptors spread across a fixed number of scheduling groups. The
//! `order_index` assigned here is the only ordering authority anywhere
//! in the pipeline; downstream stages never rely on arrival order.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};
use crate::job::{Job, JobId};
use crate::video::VideoDescriptor;

/// One fixed-duration slice of the source timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SegmentDescriptor {
    /// Seconds from the start of the source
    pub start_offset: f64,

    /// Nominal length in seconds; the final segment keeps the nominal
    /// value even when the source ends earlier, trimming at the boundary
    /// is the transcoder's concern
    pub duration: f64,

    /// Global position on the source timeline, zero-based
    pub order_index: u32,
}

/// A scheduling bucket of segments assigned to one fan-out worker.
///
/// Carries no ordering semantics of its own. A trailing group may be
/// shorter than the rest or empty when the segment count does not fill
/// the configured fan-out width.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SegmentGroup(pub Vec<SegmentDescriptor>);

impl SegmentGroup {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SegmentDescriptor> {
        self.0.iter()
    }
}

/// One unit of fan-out work: a single segment plus everything the
/// transcoder needs to fetch, cut, and store it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SegmentWorkItem {
    /// Owning job
    pub job_id: JobId,

    /// Presigned, time-limited URL for the source object
    pub source_url: String,

    /// Bucket holding the source object
    pub s3_bucket: String,

    /// Source key prefix, carried through to the result
    pub s3_prefix: String,

    /// Source filename, carried through to the result
    pub object_name: String,

    /// Index of the plan group this segment belongs to
    pub group_index: u32,

    /// The segment to cut
    pub segment: SegmentDescriptor,
}

/// Deterministic partition of one source video into grouped segments.
///
/// Output of the planner stage and, after fan-out, the sole input to the
/// segment transcoder. Building a plan twice from the same inputs yields
/// byte-identical JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PartitionPlan {
    /// The owning job
    pub job: Job,

    /// Probe output the plan was derived from
    pub video_descriptor: VideoDescriptor,

    /// Scheduling groups in fan-out order
    pub groups: Vec<SegmentGroup>,
}

impl PartitionPlan {
    /// Partition the source timeline into `group_count` scheduling groups.
    ///
    /// `segment_count = ceil(duration / segment_time)` segments are laid
    /// out row-major: group `g` holds consecutive order indices starting
    /// at `g * group_segment_count`, and generation stops once the global
    /// remaining count hits zero. Only the last populated group may be
    /// short; groups after it stay empty.
    ///
    /// A descriptor with no video stream yields a plan with zero groups,
    /// which downstream stages treat as "nothing to do" rather than an
    /// error.
    pub fn build(
        job: Job,
        video_descriptor: VideoDescriptor,
        group_count: u32,
    ) -> PlanResult<Self> {
        if job.segment_time <= 0.0 {
            return Err(PlanError::InvalidSegmentTime(job.segment_time));
        }
        if group_count == 0 {
            return Err(PlanError::InvalidGroupCount(group_count));
        }

        let mut groups = Vec::new();
        if video_descriptor.first_video_stream().is_some() {
            let video_duration = video_descriptor
                .video_duration()
                .ok_or(PlanError::MissingDuration)?;

            let segment_time = job.segment_time;
            let segment_count = (video_duration / segment_time).ceil() as u32;
            let group_segment_count = segment_count.div_ceil(group_count);

            let mut remaining = segment_count;
            groups.reserve(group_count as usize);
            for group_index in 0..group_count {
                let mut segments = Vec::new();
                for local_index in 0..group_segment_count {
                    if remaining == 0 {
                        break;
                    }
                    let order_index = group_index * group_segment_count + local_index;
                    segments.push(SegmentDescriptor {
                        start_offset: segment_time * order_index as f64,
                        duration: segment_time,
                        order_index,
                    });
                    remaining -= 1;
                }
                groups.push(SegmentGroup(segments));
            }
        }

        Ok(Self {
            job,
            video_descriptor,
            groups,
        })
    }

    /// Total segments across all groups.
    pub fn segment_count(&self) -> usize {
        self.groups.iter().map(SegmentGroup::len).sum()
    }

    /// True when the plan contains no segments at all.
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(SegmentGroup::is_empty)
    }

    /// Flatten the plan into one work item per segment, all pointing at
    /// the same presigned source URL.
    pub fn work_items(&self, source_url: impl Into<String>) -> Vec<SegmentWorkItem> {
        let source_url = source_url.into();
        let mut items = Vec::with_capacity(self.segment_count());
        for (group_index, group) in self.groups.iter().enumerate() {
            for segment in group.iter() {
                items.push(SegmentWorkItem {
                    job_id: self.job.job_id.clone(),
                    source_url: source_url.clone(),
                    s3_bucket: self.job.source_bucket.clone(),
                    s3_prefix: self.job.source_key_prefix.clone(),
                    object_name: self.job.source_object_name.clone(),
                    group_index: group_index as u32,
                    segment: segment.clone(),
                });
            }
        }
        items
    }
}
