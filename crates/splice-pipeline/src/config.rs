//! Pipeline configuration.

use std::time::Duration;

/// Process-wide configuration for the pipeline stages.
///
/// Constructed once at process start and handed into each stage; there is
/// no ambient global state.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Fan-out width: number of scheduling groups the planner emits
    pub parallel_groups: u32,
    /// Default segment length in seconds, used when a job omits its own
    pub segment_time: f64,
    /// Bucket that receives segment artifacts and manifests
    pub media_bucket: String,
    /// Lifetime of presigned source URLs
    pub presign_ttl: Duration,
    /// Scratch directory for encoded segments
    pub work_dir: String,
    /// Output vertical resolution in pixels
    pub scale_height: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parallel_groups: 3,
            segment_time: 20.0,
            media_bucket: "splice-media".to_string(),
            presign_ttl: Duration::from_secs(600),
            work_dir: "/tmp".to_string(),
            scale_height: 720,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    ///
    /// Unset or unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            parallel_groups: std::env::var("PARALLEL_GROUPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            segment_time: std::env::var("SEGMENT_TIME")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20.0),
            media_bucket: std::env::var("MEDIA_BUCKET")
                .unwrap_or_else(|_| "splice-media".to_string()),
            presign_ttl: Duration::from_secs(
                std::env::var("PRESIGN_TTL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/tmp".to_string()),
            scale_height: std::env::var("SCALE_HEIGHT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(720),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();

        assert_eq!(config.parallel_groups, 3);
        assert_eq!(config.segment_time, 20.0);
        assert_eq!(config.presign_ttl, Duration::from_secs(600));
        assert_eq!(config.work_dir, "/tmp");
        assert_eq!(config.scale_height, 720);
    }
}
