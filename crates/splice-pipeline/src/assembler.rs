//! Assembler stage: reorder results and persist the playlist.

use tracing::info;

use splice_models::{AssembleRequest, AssembleSummary, Manifest};
use splice_storage::ObjectStore;

use crate::config::PipelineConfig;
use crate::error::StageResult;

/// Final stage of the pipeline.
///
/// Takes the fanned-in results exactly as the orchestrator collected them,
/// rebuilds timeline order from each result's `order_index`, and writes
/// the playlist. The shape and arrival order of the groups never affect
/// the output.
pub struct Assembler<S: ObjectStore> {
    config: PipelineConfig,
    store: S,
}

impl<S: ObjectStore> Assembler<S> {
    pub fn new(config: PipelineConfig, store: S) -> Self {
        Self { config, store }
    }

    /// Run the stage for one fanned-in result set.
    ///
    /// An empty result set produces a header/footer-only playlist with a
    /// zero segment count, not an error. A duplicate or missing
    /// `order_index` fails the stage: the timeline is no longer covered
    /// and a playlist must not pretend otherwise.
    pub async fn assemble(&self, request: AssembleRequest) -> StageResult<AssembleSummary> {
        let manifest = Manifest::from_grouped(&request.object_name, request.groups)?;
        let segment_count = manifest.segment_count();

        let key = request.job_id.output_key(&manifest.file_name);
        self.store
            .upload_bytes(
                manifest.render().into_bytes(),
                &self.config.media_bucket,
                &key,
                "application/vnd.apple.mpegurl",
            )
            .await?;

        info!(
            job_id = %request.job_id,
            segment_count,
            key = %key,
            "Manifest assembled and stored"
        );

        Ok(AssembleSummary {
            input_segments: segment_count as u32,
            m3u8_file: manifest.file_name,
            create_hls: 0,
            output_bucket: self.config.media_bucket.clone(),
            output_key: key,
        })
    }
}
