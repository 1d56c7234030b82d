//! FFprobe source inspection.

use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use splice_models::{StreamDescriptor, VideoDescriptor};

use crate::command::check_ffprobe;
use crate::error::{MediaError, MediaResult};

/// Capability to describe a source's streams and duration.
///
/// The source locator may be a local path or a presigned URL; either way
/// the call blocks until the probe finishes or fails.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProbe: Send + Sync {
    /// Probe the source and return its stream layout and durations.
    async fn probe(&self, source_url: &str) -> MediaResult<VideoDescriptor>;
}

/// FFprobe-backed implementation of [`MediaProbe`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FfprobeProbe;

impl FfprobeProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MediaProbe for FfprobeProbe {
    async fn probe(&self, source_url: &str) -> MediaResult<VideoDescriptor> {
        check_ffprobe()?;

        debug!("Probing source with ffprobe");
        let output = Command::new("ffprobe")
            .args(["-v", "error", "-show_format", "-show_streams", "-of", "json"])
            .arg(source_url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(MediaError::ffprobe_failed(
                "FFprobe exited with non-zero status",
                Some(String::from_utf8_lossy(&output.stderr).to_string()),
            ));
        }

        let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;
        Ok(probe.into_descriptor())
    }
}

/// FFprobe JSON output format. Durations arrive as strings.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    duration: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

impl FfprobeOutput {
    fn into_descriptor(self) -> VideoDescriptor {
        VideoDescriptor {
            container_duration: parse_seconds(self.format.duration.as_deref()),
            streams: self
                .streams
                .into_iter()
                .map(|s| StreamDescriptor {
                    codec_type: s.codec_type,
                    codec_name: s.codec_name,
                    duration: parse_seconds(s.duration.as_deref()),
                    width: s.width,
                    height: s.height,
                })
                .collect(),
        }
    }
}

/// Parse an ffprobe duration string (e.g. "95.000000").
fn parse_seconds(s: Option<&str>) -> Option<f64> {
    s.and_then(|v| v.parse::<f64>().ok())
}
