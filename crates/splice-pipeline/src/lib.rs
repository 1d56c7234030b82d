//! Pipeline stages for parallel HLS transcoding.
//!
//! Three stages composed by an external orchestrator: [`Planner`]
//! partitions the source timeline, [`SegmentTranscoder`] runs once per
//! segment under fan-out, and [`Assembler`] rebuilds the ordered playlist
//! after fan-in. Stages carry no state between invocations; everything
//! travels in the work descriptors from `splice-models`.

pub mod assembler;
pub mod config;
pub mod error;
pub mod planner;
pub mod transcoder;

pub use assembler::Assembler;
pub use config::PipelineConfig;
pub use error::{StageError, StageResult};
pub use planner::Planner;
pub use transcoder::SegmentTranscoder;
