//! Stage tests over mocked capabilities.
//!
//! No real ffmpeg, ffprobe, or object store is touched here; the mocks
//! stand in for the external collaborators so the stage contracts can be
//! checked exactly.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;

use splice_media::{MediaError, MediaProbe, MediaResult, MediaTranscoder};
use splice_models::{
    AssembleRequest, GroupedResults, JobId, JobRequest, SegmentDescriptor, SegmentResult,
    SegmentWorkItem, StreamDescriptor, VideoDescriptor,
};
use splice_pipeline::{Assembler, PipelineConfig, Planner, SegmentTranscoder, StageError};
use splice_storage::{ObjectStore, StorageError, StorageResult};

mock! {
    pub Probe {}

    #[async_trait]
    impl MediaProbe for Probe {
        async fn probe(&self, source_url: &str) -> MediaResult<VideoDescriptor>;
    }
}

mock! {
    pub Transcoder {}

    #[async_trait]
    impl MediaTranscoder for Transcoder {
        async fn transcode_segment(
            &self,
            source_url: &str,
            segment: &SegmentDescriptor,
            output_path: &Path,
        ) -> MediaResult<()>;
    }
}

mock! {
    pub Store {}

    #[async_trait]
    impl ObjectStore for Store {
        async fn presign_get(
            &self,
            bucket: &str,
            key: &str,
            expires_in: Duration,
        ) -> StorageResult<String>;

        async fn upload_file(
            &self,
            path: &Path,
            bucket: &str,
            key: &str,
            content_type: &str,
        ) -> StorageResult<()>;

        async fn upload_bytes(
            &self,
            data: Vec<u8>,
            bucket: &str,
            key: &str,
            content_type: &str,
        ) -> StorageResult<()>;
    }
}

fn test_config(work_dir: &str) -> PipelineConfig {
    PipelineConfig {
        media_bucket: "media-out".to_string(),
        work_dir: work_dir.to_string(),
        ..PipelineConfig::default()
    }
}

fn video_descriptor(duration: f64) -> VideoDescriptor {
    VideoDescriptor {
        container_duration: Some(duration),
        streams: vec![StreamDescriptor {
            codec_type: "video".to_string(),
            codec_name: Some("h264".to_string()),
            duration: Some(duration),
            width: Some(1920),
            height: Some(1080),
        }],
    }
}

fn work_item(job_id: &str, order_index: u32) -> SegmentWorkItem {
    SegmentWorkItem {
        job_id: JobId::from_string(job_id),
        source_url: "https://example.com/presigned".to_string(),
        s3_bucket: "media".to_string(),
        s3_prefix: "input/".to_string(),
        object_name: "video.mp4".to_string(),
        group_index: order_index / 2,
        segment: SegmentDescriptor {
            start_offset: 20.0 * order_index as f64,
            duration: 20.0,
            order_index,
        },
    }
}

fn segment_result(order_index: u32) -> SegmentResult {
    SegmentResult {
        job_id: JobId::from_string("job-1"),
        order_index,
        s3_bucket: "media".to_string(),
        s3_prefix: "input/".to_string(),
        object_name: "video.mp4".to_string(),
        artifact_name: format!("segment_{}.ts", order_index),
    }
}

// ---------------------------------------------------------------- planner

#[tokio::test]
async fn test_planner_presigns_probes_and_partitions() {
    let mut store = MockStore::new();
    store
        .expect_presign_get()
        .withf(|bucket, key, ttl| {
            bucket == "media" && key == "input/video.mp4" && *ttl == Duration::from_secs(600)
        })
        .times(1)
        .returning(|_, _, _| Ok("https://example.com/presigned".to_string()));

    let mut probe = MockProbe::new();
    probe
        .expect_probe()
        .withf(|url| url == "https://example.com/presigned")
        .times(1)
        .returning(|_| Ok(video_descriptor(95.0)));

    let planner = Planner::new(test_config("/tmp"), probe, store);
    let plan = planner
        .plan(JobRequest::from_key("media", "input/video.mp4"))
        .await
        .unwrap();

    assert_eq!(plan.segment_count(), 5);
    assert_eq!(plan.groups.len(), 3);
    assert_eq!(plan.groups[0].len(), 2);
    assert_eq!(plan.groups[2].len(), 1);
    assert_eq!(plan.job.segment_time, 20.0);

    let items = plan.work_items("https://example.com/presigned");
    let indices: Vec<u32> = items.iter().map(|i| i.segment.order_index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn test_planner_rejects_bad_segment_time_before_external_calls() {
    // no expectations set: any call on either mock would panic
    let planner = Planner::new(test_config("/tmp"), MockProbe::new(), MockStore::new());

    let mut request = JobRequest::from_key("media", "input/video.mp4");
    request.segment_time = Some(0.0);

    let err = planner.plan(request).await.unwrap_err();
    assert!(matches!(err, StageError::InvalidInput(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_planner_rejects_missing_bucket() {
    let planner = Planner::new(test_config("/tmp"), MockProbe::new(), MockStore::new());

    let err = planner
        .plan(JobRequest::from_key("", "input/video.mp4"))
        .await
        .unwrap_err();
    assert!(matches!(err, StageError::InvalidInput(_)));
}

#[tokio::test]
async fn test_planner_source_without_video_yields_empty_plan() {
    let mut store = MockStore::new();
    store
        .expect_presign_get()
        .returning(|_, _, _| Ok("https://example.com/presigned".to_string()));

    let mut probe = MockProbe::new();
    probe.expect_probe().returning(|_| {
        Ok(VideoDescriptor {
            container_duration: Some(95.0),
            streams: vec![StreamDescriptor {
                codec_type: "audio".to_string(),
                codec_name: Some("aac".to_string()),
                duration: Some(95.0),
                width: None,
                height: None,
            }],
        })
    });

    let planner = Planner::new(test_config("/tmp"), probe, store);
    let plan = planner
        .plan(JobRequest::from_key("media", "input/audio.mp4"))
        .await
        .unwrap();

    assert!(plan.is_empty());
    assert!(plan.groups.is_empty());
}

#[tokio::test]
async fn test_planner_probe_failure_is_retryable() {
    let mut store = MockStore::new();
    store
        .expect_presign_get()
        .returning(|_, _, _| Ok("https://example.com/presigned".to_string()));

    let mut probe = MockProbe::new();
    probe.expect_probe().returning(|_| {
        Err(MediaError::ffprobe_failed(
            "FFprobe exited with non-zero status",
            Some("moov atom not found".to_string()),
        ))
    });

    let planner = Planner::new(test_config("/tmp"), probe, store);
    let err = planner
        .plan(JobRequest::from_key("media", "input/video.mp4"))
        .await
        .unwrap_err();

    assert!(matches!(err, StageError::Probe { .. }));
    assert!(err.is_retryable());
}

// ------------------------------------------------------------- transcoder

#[tokio::test]
async fn test_transcode_stores_artifact_at_deterministic_key() {
    let work_dir = tempfile::tempdir().unwrap();

    let mut transcoder = MockTranscoder::new();
    transcoder
        .expect_transcode_segment()
        .withf(|url, segment, _| {
            url == "https://example.com/presigned" && segment.order_index == 3
        })
        .times(1)
        .returning(|_, _, path| {
            std::fs::write(path, b"ts-bytes").unwrap();
            Ok(())
        });

    let mut store = MockStore::new();
    store
        .expect_upload_file()
        .withf(|_, bucket, key, content_type| {
            bucket == "media-out"
                && key == "output/job-1/segment_3.ts"
                && content_type == "video/mp2t"
        })
        .times(1)
        .returning(|_, _, _, _| Ok(()));

    let stage = SegmentTranscoder::new(
        test_config(work_dir.path().to_str().unwrap()),
        transcoder,
        store,
    );
    let result = stage.transcode(work_item("job-1", 3)).await.unwrap();

    assert_eq!(result.order_index, 3);
    assert_eq!(result.artifact_name, "segment_3.ts");
    assert_eq!(result.s3_bucket, "media-out");
    assert_eq!(result.object_name, "video.mp4");

    // scratch copy is cleaned up after upload
    let local = work_dir.path().join("job-1").join("segment_3.ts");
    assert!(!local.exists());
}

#[tokio::test]
async fn test_result_bucket_names_where_artifact_lives() {
    let work_dir = tempfile::tempdir().unwrap();

    let mut transcoder = MockTranscoder::new();
    transcoder
        .expect_transcode_segment()
        .returning(|_, _, path| {
            std::fs::write(path, b"ts-bytes").unwrap();
            Ok(())
        });

    let upload_bucket = Arc::new(Mutex::new(String::new()));
    let captured = upload_bucket.clone();
    let mut store = MockStore::new();
    store
        .expect_upload_file()
        .returning(move |_, bucket, _, _| {
            *captured.lock().unwrap() = bucket.to_string();
            Ok(())
        });

    let stage = SegmentTranscoder::new(
        test_config(work_dir.path().to_str().unwrap()),
        transcoder,
        store,
    );
    let result = stage.transcode(work_item("job-1", 1)).await.unwrap();

    // the reference must point at the artifact, not the source: a
    // consumer following result.s3_bucket/artifact_name has to find the
    // bytes that were just uploaded
    assert_eq!(result.s3_bucket, *upload_bucket.lock().unwrap());
}

#[tokio::test]
async fn test_transcode_retry_overwrites_the_same_artifact() {
    let work_dir = tempfile::tempdir().unwrap();

    let mut transcoder = MockTranscoder::new();
    transcoder
        .expect_transcode_segment()
        .times(2)
        .returning(|_, _, path| {
            std::fs::write(path, b"ts-bytes").unwrap();
            Ok(())
        });

    let uploaded_keys = Arc::new(Mutex::new(Vec::new()));
    let keys = uploaded_keys.clone();
    let mut store = MockStore::new();
    store
        .expect_upload_file()
        .times(2)
        .returning(move |_, _, key, _| {
            keys.lock().unwrap().push(key.to_string());
            Ok(())
        });

    let stage = SegmentTranscoder::new(
        test_config(work_dir.path().to_str().unwrap()),
        transcoder,
        store,
    );

    let first = stage.transcode(work_item("job-1", 4)).await.unwrap();
    let second = stage.transcode(work_item("job-1", 4)).await.unwrap();

    assert_eq!(first, second);
    let keys = uploaded_keys.lock().unwrap();
    assert_eq!(
        *keys,
        vec![
            "output/job-1/segment_4.ts".to_string(),
            "output/job-1/segment_4.ts".to_string()
        ]
    );
}

#[tokio::test]
async fn test_transcode_failure_produces_no_result() {
    let work_dir = tempfile::tempdir().unwrap();

    let mut transcoder = MockTranscoder::new();
    transcoder
        .expect_transcode_segment()
        .returning(|_, _, _| {
            Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                Some("Invalid data found".to_string()),
                Some(1),
            ))
        });

    // no upload expectation: reaching the store would panic
    let stage = SegmentTranscoder::new(
        test_config(work_dir.path().to_str().unwrap()),
        transcoder,
        MockStore::new(),
    );
    let err = stage.transcode(work_item("job-1", 2)).await.unwrap_err();

    match &err {
        StageError::Transcode {
            job_id,
            order_index,
            ..
        } => {
            assert_eq!(job_id.as_str(), "job-1");
            assert_eq!(*order_index, 2);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_upload_failure_propagates() {
    let work_dir = tempfile::tempdir().unwrap();

    let mut transcoder = MockTranscoder::new();
    transcoder
        .expect_transcode_segment()
        .returning(|_, _, path| {
            std::fs::write(path, b"ts-bytes").unwrap();
            Ok(())
        });

    let mut store = MockStore::new();
    store.expect_upload_file().returning(|_, bucket, key, _| {
        Err(StorageError::upload_failed(bucket, key, "connection reset"))
    });

    let stage = SegmentTranscoder::new(
        test_config(work_dir.path().to_str().unwrap()),
        transcoder,
        store,
    );
    let err = stage.transcode(work_item("job-1", 0)).await.unwrap_err();

    assert!(matches!(err, StageError::Storage(_)));
    assert!(err.is_retryable());
}

// -------------------------------------------------------------- assembler

#[tokio::test]
async fn test_assemble_uploads_ordered_playlist() {
    let rendered = Arc::new(Mutex::new(String::new()));
    let captured = rendered.clone();

    let mut store = MockStore::new();
    store
        .expect_upload_bytes()
        .withf(|_, bucket, key, content_type| {
            bucket == "media-out"
                && key == "output/job-1/video.m3u8"
                && content_type == "application/vnd.apple.mpegurl"
        })
        .times(1)
        .returning(move |data, _, _, _| {
            *captured.lock().unwrap() = String::from_utf8(data).unwrap();
            Ok(())
        });

    let assembler = Assembler::new(test_config("/tmp"), store);
    let summary = assembler
        .assemble(AssembleRequest {
            job_id: JobId::from_string("job-1"),
            object_name: "video.mp4".to_string(),
            groups: GroupedResults(vec![
                vec![segment_result(1), segment_result(0)],
                vec![segment_result(3), segment_result(2)],
                vec![segment_result(4)],
            ]),
        })
        .await
        .unwrap();

    assert_eq!(summary.input_segments, 5);
    assert_eq!(summary.m3u8_file, "video.m3u8");
    assert_eq!(summary.create_hls, 0);
    assert_eq!(summary.output_bucket, "media-out");
    assert_eq!(summary.output_key, "output/job-1/video.m3u8");

    let text = rendered.lock().unwrap();
    assert!(text.starts_with("#EXTM3U\n"));
    assert!(text.ends_with("#EXT-X-ENDLIST\n"));
    let entry_positions: Vec<usize> = (0..5)
        .map(|i| text.find(&format!("segment_{}.ts", i)).unwrap())
        .collect();
    assert!(entry_positions.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_assemble_is_invariant_under_arrival_order() {
    let shapes = vec![
        GroupedResults(vec![
            vec![segment_result(0), segment_result(1)],
            vec![segment_result(2), segment_result(3)],
            vec![segment_result(4)],
        ]),
        GroupedResults(vec![
            vec![segment_result(4)],
            vec![segment_result(3), segment_result(2)],
            vec![segment_result(1), segment_result(0)],
        ]),
    ];

    let mut summaries = Vec::new();
    let mut playlists = Vec::new();
    for groups in shapes {
        let rendered = Arc::new(Mutex::new(String::new()));
        let captured = rendered.clone();

        let mut store = MockStore::new();
        store
            .expect_upload_bytes()
            .returning(move |data, _, _, _| {
                *captured.lock().unwrap() = String::from_utf8(data).unwrap();
                Ok(())
            });

        let assembler = Assembler::new(test_config("/tmp"), store);
        let summary = assembler
            .assemble(AssembleRequest {
                job_id: JobId::from_string("job-1"),
                object_name: "video.mp4".to_string(),
                groups,
            })
            .await
            .unwrap();

        summaries.push(summary);
        playlists.push(rendered.lock().unwrap().clone());
    }

    assert_eq!(summaries[0], summaries[1]);
    assert_eq!(playlists[0], playlists[1]);
}

#[tokio::test]
async fn test_assemble_empty_results_is_a_valid_terminal() {
    let rendered = Arc::new(Mutex::new(String::new()));
    let captured = rendered.clone();

    let mut store = MockStore::new();
    store
        .expect_upload_bytes()
        .returning(move |data, _, _, _| {
            *captured.lock().unwrap() = String::from_utf8(data).unwrap();
            Ok(())
        });

    let assembler = Assembler::new(test_config("/tmp"), store);
    let summary = assembler
        .assemble(AssembleRequest {
            job_id: JobId::from_string("job-1"),
            object_name: "video.mp4".to_string(),
            groups: GroupedResults::new(),
        })
        .await
        .unwrap();

    assert_eq!(summary.input_segments, 0);
    let text = rendered.lock().unwrap();
    assert!(!text.contains("#EXTINF"));
    assert!(text.contains("#EXT-X-ENDLIST\n"));
}

#[tokio::test]
async fn test_assemble_rejects_missing_segment() {
    // no upload expectation: a gap must fail before anything is persisted
    let assembler = Assembler::new(test_config("/tmp"), MockStore::new());

    let err = assembler
        .assemble(AssembleRequest {
            job_id: JobId::from_string("job-1"),
            object_name: "video.mp4".to_string(),
            groups: GroupedResults(vec![vec![segment_result(0)], vec![segment_result(2)]]),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, StageError::Plan(_)));
    assert!(!err.is_retryable());
}

// ------------------------------------------------------------- end-to-end

/// Drive all three stages in-process: plan, transcode every work item,
/// regroup by the plan's group indices, assemble.
#[tokio::test]
async fn test_plan_transcode_assemble_round_trip() {
    let work_dir = tempfile::tempdir().unwrap();

    let mut store = MockStore::new();
    store
        .expect_presign_get()
        .returning(|_, _, _| Ok("https://example.com/presigned".to_string()));
    let mut probe = MockProbe::new();
    probe
        .expect_probe()
        .returning(|_| Ok(video_descriptor(95.0)));

    let planner = Planner::new(test_config("/tmp"), probe, store);
    let mut request = JobRequest::from_key("media", "input/video.mp4");
    request.job_id = Some(JobId::from_string("job-1"));
    let plan = planner.plan(request).await.unwrap();
    let items = plan.work_items("https://example.com/presigned");
    assert_eq!(items.len(), 5);

    let mut transcoder = MockTranscoder::new();
    transcoder
        .expect_transcode_segment()
        .times(5)
        .returning(|_, _, path| {
            std::fs::write(path, b"ts-bytes").unwrap();
            Ok(())
        });
    let mut store = MockStore::new();
    store
        .expect_upload_file()
        .times(5)
        .returning(|_, _, _, _| Ok(()));

    let stage = SegmentTranscoder::new(
        test_config(work_dir.path().to_str().unwrap()),
        transcoder,
        store,
    );

    // complete in reverse order to prove ordering comes from the data
    let mut indexed = Vec::new();
    for item in items.into_iter().rev() {
        let group_index = item.group_index;
        let result = stage.transcode(item).await.unwrap();
        indexed.push((group_index, result));
    }
    let grouped = GroupedResults::from_indexed(indexed);

    let rendered = Arc::new(Mutex::new(String::new()));
    let captured = rendered.clone();
    let mut store = MockStore::new();
    store
        .expect_upload_bytes()
        .returning(move |data, _, _, _| {
            *captured.lock().unwrap() = String::from_utf8(data).unwrap();
            Ok(())
        });

    let assembler = Assembler::new(test_config("/tmp"), store);
    let summary = assembler
        .assemble(AssembleRequest {
            job_id: plan.job.job_id.clone(),
            object_name: plan.job.source_object_name.clone(),
            groups: grouped,
        })
        .await
        .unwrap();

    assert_eq!(summary.input_segments, 5);
    assert_eq!(summary.output_key, "output/job-1/video.m3u8");

    let text = rendered.lock().unwrap();
    let expected_entries: Vec<String> =
        (0..5).map(|i| format!("segment_{}.ts", i)).collect();
    let listed: Vec<&str> = text
        .lines()
        .filter(|line| line.ends_with(".ts"))
        .collect();
    assert_eq!(listed, expected_entries);
}
