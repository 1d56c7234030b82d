//! Segment transcoding.

use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use splice_models::SegmentDescriptor;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Capability to cut one segment out of a source and encode it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaTranscoder: Send + Sync {
    /// Cut `segment` out of the source and write an MPEG-TS artifact to
    /// `output_path`. Runs to completion or fails; a failure must never
    /// leave a result that looks successful.
    async fn transcode_segment(
        &self,
        source_url: &str,
        segment: &SegmentDescriptor,
        output_path: &Path,
    ) -> MediaResult<()>;
}

/// FFmpeg-backed segment transcoder.
///
/// Cuts with a two-phase seek: a fast input-side seek to one second before
/// the segment, clamped at the start of the source, then an accurate
/// output-side skip of the remainder. Video is scaled to a fixed height
/// and encoded with stitchable x264 options so independently produced
/// segments concatenate cleanly; audio is copied. The MP4 intermediate is
/// then remuxed into MPEG-TS with the Annex B bitstream filter.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    scale_height: u32,
    runner: FfmpegRunner,
}

impl FfmpegTranscoder {
    /// Create a transcoder targeting the given output height.
    pub fn new(scale_height: u32) -> Self {
        Self {
            scale_height,
            runner: FfmpegRunner::new(),
        }
    }

    fn cut_command(
        &self,
        source_url: &str,
        segment: &SegmentDescriptor,
        mp4_path: &Path,
    ) -> FfmpegCommand {
        let pre_seek = (segment.start_offset - 1.0).max(0.0);
        let skip = segment.start_offset - pre_seek;

        FfmpegCommand::new(source_url, mp4_path)
            .seek(pre_seek)
            .skip(skip)
            .duration(segment.duration)
            .video_filter(format!("scale=-1:{}", self.scale_height))
            .x264_options("stitchable")
            .audio_codec("copy")
    }

    fn remux_command(&self, mp4_path: &Path, ts_path: &Path) -> FfmpegCommand {
        FfmpegCommand::new(mp4_path.to_string_lossy(), ts_path)
            .video_codec("copy")
            .audio_codec("copy")
            .bitstream_filter("h264_mp4toannexb")
    }
}

#[async_trait]
impl MediaTranscoder for FfmpegTranscoder {
    async fn transcode_segment(
        &self,
        source_url: &str,
        segment: &SegmentDescriptor,
        output_path: &Path,
    ) -> MediaResult<()> {
        info!(
            order_index = segment.order_index,
            start_offset = segment.start_offset,
            duration = segment.duration,
            "Transcoding segment"
        );

        // MP4 intermediate beside the final artifact, deterministic so a
        // retry overwrites instead of accumulating
        let mp4_path = output_path.with_extension("mp4");

        self.runner
            .run(&self.cut_command(source_url, segment, &mp4_path))
            .await?;
        self.runner
            .run(&self.remux_command(&mp4_path, output_path))
            .await?;

        // Intermediate is scratch; ignore cleanup failures
        let _ = tokio::fs::remove_file(&mp4_path).await;

        Ok(())
    }
}
