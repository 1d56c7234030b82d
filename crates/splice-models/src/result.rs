//! Per-segment transcode results and their fan-in grouping.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};
use crate::job::JobId;

/// Artifact filename for a segment, embedding its order index.
///
/// Embedding the index in the name is what lets the assembler recover
/// timeline order from an unordered pile of results, and it makes retries
/// overwrite the same key instead of leaving orphans.
pub fn artifact_name(order_index: u32) -> String {
    format!("segment_{}.ts", order_index)
}

/// Reference to one transcoded segment artifact in durable storage.
///
/// Produced once per segment descriptor; carries the reference only,
/// never the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SegmentResult {
    /// Owning job
    pub job_id: JobId,

    /// Global timeline position of the segment
    pub order_index: u32,

    /// Bucket holding the artifact
    pub s3_bucket: String,

    /// Source key prefix, passed through from the work item
    pub s3_prefix: String,

    /// Source filename, passed through from the work item
    pub object_name: String,

    /// Artifact filename, embeds `order_index`
    pub artifact_name: String,
}

/// Transcode results nested exactly as fan-out produced them.
///
/// The outer sequence mirrors the plan's groups; inner order is completion
/// order and means nothing. The only contract is "a sequence of sequences
/// of results": reordering groups or the results inside a group must not
/// change what assembly produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct GroupedResults(pub Vec<Vec<SegmentResult>>);

impl GroupedResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no group contains any result.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Vec::is_empty)
    }

    /// Total results across all groups.
    pub fn result_count(&self) -> usize {
        self.0.iter().map(Vec::len).sum()
    }

    /// Rebuild the fan-in shape from `(group_index, result)` pairs, in any
    /// order. Groups missing from the input come back empty.
    pub fn from_indexed(results: impl IntoIterator<Item = (u32, SegmentResult)>) -> Self {
        let mut groups: Vec<Vec<SegmentResult>> = Vec::new();
        for (group_index, result) in results {
            let index = group_index as usize;
            if groups.len() <= index {
                groups.resize_with(index + 1, Vec::new);
            }
            groups[index].push(result);
        }
        Self(groups)
    }

    /// Flatten and sort by `order_index`, verifying the indices form the
    /// contiguous range `0..n`.
    ///
    /// A duplicate means a segment was produced twice under different
    /// names; a gap means one is missing. Either way the timeline coverage
    /// is broken and assembly must fail rather than emit a bad playlist.
    pub fn into_ordered(self) -> PlanResult<Vec<SegmentResult>> {
        let mut flat: Vec<SegmentResult> = self.0.into_iter().flatten().collect();
        flat.sort_by_key(|r| r.order_index);

        for (i, result) in flat.iter().enumerate() {
            let expected = i as u32;
            if result.order_index == expected {
                continue;
            }
            if i > 0 && result.order_index == flat[i - 1].order_index {
                return Err(PlanError::DuplicateOrderIndex(result.order_index));
            }
            return Err(PlanError::OrderIndexGap {
                expected,
                found: result.order_index,
            });
        }

        Ok(flat)
    }
}
