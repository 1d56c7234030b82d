//! Job definitions for the transcoding pipeline.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a transcoding job.
///
/// Caller-supplied in normal operation; namespaces every output artifact
/// the job produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Durable storage key for a file this job produced.
    pub fn output_key(&self, file_name: &str) -> String {
        format!("output/{}/{}", self.0, file_name)
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Caller-supplied request for one end-to-end transcoding run.
///
/// This is the wire contract the planner stage accepts. Optional fields
/// are filled in by [`JobRequest::resolve`] before any work starts.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JobRequest {
    /// Job ID; generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,

    /// Bucket holding the source object
    pub bucket: String,

    /// Full key of the source object
    pub key: String,

    /// Key prefix, up to and including the last `/`
    pub object_prefix: String,

    /// Bare source filename
    pub object_name: String,

    /// Segment length in seconds; falls back to the configured default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_time: Option<f64>,
}

impl JobRequest {
    /// Build a request from a bucket and full object key, splitting the key
    /// into prefix and filename at the last `/`.
    pub fn from_key(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        let key = key.into();
        let (object_prefix, object_name) = match key.rfind('/') {
            Some(pos) => (key[..pos + 1].to_string(), key[pos + 1..].to_string()),
            None => (String::new(), key.clone()),
        };

        Self {
            job_id: None,
            bucket: bucket.into(),
            key,
            object_prefix,
            object_name,
            segment_time: None,
        }
    }

    /// Resolve optional fields into a concrete [`Job`].
    pub fn resolve(self, default_segment_time: f64) -> Job {
        Job {
            job_id: self.job_id.unwrap_or_default(),
            source_bucket: self.bucket,
            source_key_prefix: self.object_prefix,
            source_object_name: self.object_name,
            segment_time: self.segment_time.unwrap_or(default_segment_time),
        }
    }
}

/// One end-to-end transcoding request with every field resolved.
///
/// Immutable for the job's lifetime; travels inside the partition plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    /// Unique job ID, namespaces all output artifact paths
    pub job_id: JobId,

    /// Bucket holding the source object
    pub source_bucket: String,

    /// Source key prefix, up to and including the last `/`
    pub source_key_prefix: String,

    /// Bare source filename
    pub source_object_name: String,

    /// Segment length in seconds
    pub segment_time: f64,
}

impl Job {
    /// Create a job with all fields supplied.
    pub fn new(
        job_id: JobId,
        source_bucket: impl Into<String>,
        source_key_prefix: impl Into<String>,
        source_object_name: impl Into<String>,
        segment_time: f64,
    ) -> Self {
        Self {
            job_id,
            source_bucket: source_bucket.into(),
            source_key_prefix: source_key_prefix.into(),
            source_object_name: source_object_name.into(),
            segment_time,
        }
    }

    /// Full key of the source object.
    pub fn source_key(&self) -> String {
        format!("{}{}", self.source_key_prefix, self.source_object_name)
    }
}
