//! Probed video metadata.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One stream as reported by the probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StreamDescriptor {
    /// Stream kind, e.g. "video" or "audio"
    pub codec_type: String,

    /// Codec name, e.g. "h264"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec_name: Option<String>,

    /// Stream duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    /// Width in pixels (video streams)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Height in pixels (video streams)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl StreamDescriptor {
    pub fn is_video(&self) -> bool {
        self.codec_type == "video"
    }
}

/// Probed description of the source media.
///
/// Created once by the probe, consumed only by the planner, never
/// persisted beyond the plan that embeds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoDescriptor {
    /// Container-level duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_duration: Option<f64>,

    /// All streams in probe order
    #[serde(default)]
    pub streams: Vec<StreamDescriptor>,
}

impl VideoDescriptor {
    /// First stream the probe tagged as video.
    pub fn first_video_stream(&self) -> Option<&StreamDescriptor> {
        self.streams.iter().find(|s| s.is_video())
    }

    /// Duration used for partitioning: the video stream's own duration,
    /// falling back to the container duration.
    ///
    /// Returns `None` when no video stream exists, regardless of container
    /// metadata: a source without video is partitioned into nothing.
    pub fn video_duration(&self) -> Option<f64> {
        let stream = self.first_video_stream()?;
        stream.duration.or(self.container_duration)
    }
}
