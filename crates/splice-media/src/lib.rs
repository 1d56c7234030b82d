//! FFmpeg adapters for the splice pipeline.
//!
//! Wraps the external `ffprobe` and `ffmpeg` binaries behind narrow,
//! mockable capability traits so partitioning and assembly logic can be
//! tested without touching real media.

pub mod command;
pub mod error;
pub mod probe;
pub mod transcode;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use probe::{FfprobeProbe, MediaProbe};
pub use transcode::{FfmpegTranscoder, MediaTranscoder};
