//! Planner stage: probe the source and partition its timeline.

use tracing::info;

use splice_media::MediaProbe;
use splice_models::{JobRequest, PartitionPlan};
use splice_storage::ObjectStore;

use crate::config::PipelineConfig;
use crate::error::{StageError, StageResult};

/// First stage of the pipeline.
///
/// Resolves the caller's request into a concrete job, presigns the source
/// object, probes it, and builds the partition plan the orchestrator fans
/// out to the transcoders.
pub struct Planner<P: MediaProbe, S: ObjectStore> {
    config: PipelineConfig,
    probe: P,
    store: S,
}

impl<P: MediaProbe, S: ObjectStore> Planner<P, S> {
    pub fn new(config: PipelineConfig, probe: P, store: S) -> Self {
        Self {
            config,
            probe,
            store,
        }
    }

    /// Run the stage for one job request.
    ///
    /// Contract violations are rejected before any external call is made.
    /// A source with no video stream yields an empty plan, which the
    /// orchestrator treats as "no work to do".
    pub async fn plan(&self, request: JobRequest) -> StageResult<PartitionPlan> {
        let job = request.resolve(self.config.segment_time);

        if job.source_bucket.is_empty() {
            return Err(StageError::invalid_input("job has no source bucket"));
        }
        if job.source_object_name.is_empty() {
            return Err(StageError::invalid_input("job has no source object name"));
        }
        if job.segment_time <= 0.0 {
            return Err(StageError::invalid_input(format!(
                "segment_time {} must be greater than zero",
                job.segment_time
            )));
        }

        let source_url = self
            .store
            .presign_get(&job.source_bucket, &job.source_key(), self.config.presign_ttl)
            .await?;

        let descriptor = self
            .probe
            .probe(&source_url)
            .await
            .map_err(|source| StageError::Probe {
                job_id: job.job_id.clone(),
                source,
            })?;

        let plan = PartitionPlan::build(job, descriptor, self.config.parallel_groups)?;

        info!(
            job_id = %plan.job.job_id,
            segment_count = plan.segment_count(),
            group_count = plan.groups.len(),
            "Partition plan built"
        );

        Ok(plan)
    }
}
