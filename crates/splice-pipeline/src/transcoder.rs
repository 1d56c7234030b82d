//! Segment transcoder stage: cut, encode, and persist one segment.

use std::path::{Path, PathBuf};
use tracing::info;

use splice_media::MediaTranscoder;
use splice_models::{artifact_name, SegmentResult, SegmentWorkItem};
use splice_storage::ObjectStore;

use crate::config::PipelineConfig;
use crate::error::{StageError, StageResult};

/// Second stage of the pipeline, run once per segment work item.
///
/// Invocations are isolated: no shared state, no ordering among them. The
/// artifact path is a pure function of `(job_id, order_index)`, so a retry
/// of the same work item overwrites its previous output instead of leaving
/// duplicates behind.
pub struct SegmentTranscoder<T: MediaTranscoder, S: ObjectStore> {
    config: PipelineConfig,
    transcoder: T,
    store: S,
}

impl<T: MediaTranscoder, S: ObjectStore> SegmentTranscoder<T, S> {
    pub fn new(config: PipelineConfig, transcoder: T, store: S) -> Self {
        Self {
            config,
            transcoder,
            store,
        }
    }

    /// Local scratch path for a segment artifact.
    fn local_path(&self, item: &SegmentWorkItem, artifact: &str) -> PathBuf {
        Path::new(&self.config.work_dir)
            .join(item.job_id.as_str())
            .join(artifact)
    }

    /// Run the stage for one work item.
    ///
    /// A failed cut or upload propagates as a stage error naming the job
    /// and segment; no result is returned for it.
    pub async fn transcode(&self, item: SegmentWorkItem) -> StageResult<SegmentResult> {
        let artifact = artifact_name(item.segment.order_index);
        let local = self.local_path(&item, &artifact);
        if let Some(parent) = local.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        self.transcoder
            .transcode_segment(&item.source_url, &item.segment, &local)
            .await
            .map_err(|source| StageError::Transcode {
                job_id: item.job_id.clone(),
                order_index: item.segment.order_index,
                source,
            })?;

        let key = item.job_id.output_key(&artifact);
        self.store
            .upload_file(&local, &self.config.media_bucket, &key, "video/mp2t")
            .await?;

        // Artifact is durable now; the scratch copy is disposable
        let _ = tokio::fs::remove_file(&local).await;

        info!(
            job_id = %item.job_id,
            order_index = item.segment.order_index,
            key = %key,
            "Segment transcoded and stored"
        );

        Ok(SegmentResult {
            job_id: item.job_id,
            order_index: item.segment.order_index,
            s3_bucket: self.config.media_bucket.clone(),
            s3_prefix: item.s3_prefix,
            object_name: item.object_name,
            artifact_name: artifact,
        })
    }
}
