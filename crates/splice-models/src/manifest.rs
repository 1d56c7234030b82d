//! HLS playlist assembly.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::PlanResult;
use crate::job::JobId;
use crate::result::GroupedResults;

/// Playback-hint duration written for every playlist entry, in seconds.
///
/// This is a fixed nominal value, not the measured artifact duration, so
/// the final (possibly shorter) segment is over-reported.
// TODO: decide whether EXTINF should carry the probed per-segment duration
// instead of the fixed nominal value.
pub const NOMINAL_SEGMENT_DURATION: f64 = 20.0;

/// Target duration advertised in the playlist header, in seconds.
pub const TARGET_DURATION: u32 = 21;

/// Playlist filename for a source object: the part before the first `.`
/// plus the `.m3u8` extension.
pub fn manifest_file_name(object_name: &str) -> String {
    let stem = object_name.split('.').next().unwrap_or(object_name);
    format!("{}.m3u8", stem)
}

/// Wire contract the assembler stage accepts: the fanned-in results plus
/// the identity needed to name and place the playlist.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssembleRequest {
    /// Owning job; namespaces the playlist storage key
    pub job_id: JobId,

    /// Bare source filename the playlist name derives from
    pub object_name: String,

    /// Transcode results, nested as fan-out produced them
    pub groups: GroupedResults,
}

/// What the assembler reports after persisting the playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AssembleSummary {
    /// Number of segment entries the playlist references
    pub input_segments: u32,

    /// Playlist filename
    pub m3u8_file: String,

    /// Always `0`; legacy flag retained for downstream consumers
    pub create_hls: u8,

    /// Bucket the playlist was written to
    pub output_bucket: String,

    /// Full storage key of the playlist
    pub output_key: String,
}

/// Ordered playlist of transcoded segment artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Manifest {
    /// Playlist filename, derived from the source object name
    pub file_name: String,

    /// Artifact filenames in ascending order-index sequence
    pub entries: Vec<String>,
}

impl Manifest {
    /// Reconstruct the playlist from grouped results.
    ///
    /// Ordering comes from each result's `order_index` alone; the shape
    /// and arrival order of the groups are irrelevant. Empty input is a
    /// valid no-work playlist, not an error.
    pub fn from_grouped(object_name: &str, grouped: GroupedResults) -> PlanResult<Self> {
        let ordered = grouped.into_ordered()?;
        Ok(Self {
            file_name: manifest_file_name(object_name),
            entries: ordered.into_iter().map(|r| r.artifact_name).collect(),
        })
    }

    /// Number of segments the playlist references.
    pub fn segment_count(&self) -> usize {
        self.entries.len()
    }

    /// Render the playlist text: fixed header, one duration+filename pair
    /// per segment, end-of-list marker.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("#EXTM3U\n");
        out.push_str("#EXT-X-VERSION:3\n");
        out.push_str("#EXT-X-MEDIA-SEQUENCE:0\n");
        out.push_str("#EXT-X-ALLOW-CACHE:YES\n");
        out.push_str(&format!("#EXT-X-TARGETDURATION:{}\n", TARGET_DURATION));

        for entry in &self.entries {
            out.push_str(&format!("#EXTINF:{:.1}\n", NOMINAL_SEGMENT_DURATION));
            out.push_str(entry);
            out.push('\n');
        }

        out.push_str("#EXT-X-ENDLIST\n");
        out
    }
}
