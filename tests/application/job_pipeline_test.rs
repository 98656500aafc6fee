use std::time::Duration;

use murmur::application::ports::{
    JobRepository, TextTask, TranscriptionError, TranscriptionOutput,
};
use murmur::application::services::{JobServiceError, PipelineError, SubmitOutcome};
use murmur::domain::{
    AudioMetadata, JobRecord, JobStatus, SpeakerSettings, TranscriptSegment, WordEntry,
};

use crate::helpers::{FakeTextService, ScriptedTranscriptionEngine, TestHarness, job_id};

fn accepted(outcome: SubmitOutcome) -> JobRecord {
    match outcome {
        SubmitOutcome::Accepted(job) => job,
        SubmitOutcome::TranscriptExists(job) => panic!("unexpected short-circuit for {}", job.id),
    }
}

#[tokio::test]
async fn given_staged_audio_and_speakers_off_when_submitting_chained_then_job_completes() {
    let harness = TestHarness::new(
        ScriptedTranscriptionEngine::text("hello world"),
        FakeTextService::new(),
    );
    let id = job_id("v1");
    harness.stage_audio(&id).await;

    let job = accepted(
        harness
            .service
            .submit(id.clone(), SpeakerSettings::disabled(), true)
            .await
            .unwrap(),
    );

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.data.text.as_deref(), Some("Hello world"));
    assert_eq!(job.data.speaker_transcript, job.data.text);
    assert!(job.data.summary.as_deref().is_some_and(|s| !s.is_empty()));
    assert_eq!(job.data.language.as_deref(), Some("en"));
    assert!(job.data.processing_time.unwrap() >= 1.5);
    assert!(job.error.is_none());
}

#[tokio::test]
async fn given_chained_submission_when_pipeline_runs_then_every_stage_is_committed_in_order() {
    let harness = TestHarness::new(
        ScriptedTranscriptionEngine::text("hello world"),
        FakeTextService::new(),
    );
    let id = job_id("ordered");
    harness.stage_audio(&id).await;

    harness
        .service
        .submit(id.clone(), SpeakerSettings::disabled(), true)
        .await
        .unwrap();

    assert_eq!(
        harness.repository.saved_statuses(&id),
        vec![
            JobStatus::Init,
            JobStatus::FetchingAudio,
            JobStatus::Transcribing,
            JobStatus::Summarizing,
            JobStatus::Completed,
        ]
    );
}

#[tokio::test]
async fn given_completed_job_when_finished_then_audio_is_released() {
    let harness = TestHarness::new(
        ScriptedTranscriptionEngine::text("hello world"),
        FakeTextService::new(),
    );
    let id = job_id("released");
    harness.stage_audio(&id).await;

    harness
        .service
        .submit(id.clone(), SpeakerSettings::disabled(), true)
        .await
        .unwrap();

    assert!(!harness.audio_exists(&id).await);
}

#[tokio::test]
async fn given_unchained_submission_when_submitting_then_only_init_is_persisted() {
    let harness = TestHarness::new(
        ScriptedTranscriptionEngine::text("hello world"),
        FakeTextService::new(),
    );
    let id = job_id("queued");

    let job = accepted(
        harness
            .service
            .submit(id.clone(), SpeakerSettings::default(), false)
            .await
            .unwrap(),
    );

    assert_eq!(job.status, JobStatus::Init);
    assert_eq!(harness.engine.calls(), 0);
    let stored = harness.repository.load(&id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Init);
    assert_eq!(stored.speaker_settings, SpeakerSettings::default());
}

#[tokio::test]
async fn given_job_committed_at_transcribing_when_resuming_then_transcription_is_not_repeated() {
    let harness = TestHarness::new(
        ScriptedTranscriptionEngine::text("should not be used"),
        FakeTextService::new(),
    );
    let id = job_id("crashed");
    let mut job = JobRecord::new(id.clone(), SpeakerSettings::disabled());
    job.status = JobStatus::Transcribing;
    job.data.text = Some("Transcript that survived the crash.".to_string());
    job.data.speaker_transcript = job.data.text.clone();
    harness.repository.save(&job).await.unwrap();

    let resumed = harness.service.resume(&id).await.unwrap();

    assert_eq!(resumed.status, JobStatus::Completed);
    assert_eq!(harness.engine.calls(), 0);
    assert_eq!(harness.text_service.calls_for(TextTask::CleanTranscript), 0);
    assert_eq!(harness.text_service.calls_for(TextTask::Summarize), 1);
    assert_eq!(
        resumed.data.text.as_deref(),
        Some("Transcript that survived the crash.")
    );
    assert!(resumed.data.summary.is_some());
}

#[tokio::test]
async fn given_failing_summaries_when_pipeline_runs_then_job_completes_without_summary() {
    let harness = TestHarness::new(
        ScriptedTranscriptionEngine::text("hello world"),
        FakeTextService::failing_summaries(),
    );
    let id = job_id("nosummary");
    harness.stage_audio(&id).await;

    let job = accepted(
        harness
            .service
            .submit(id.clone(), SpeakerSettings::disabled(), true)
            .await
            .unwrap(),
    );

    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.data.summary.is_none());
    assert_eq!(job.data.text.as_deref(), Some("Hello world"));
}

#[tokio::test]
async fn given_completed_job_when_resuming_then_same_record_is_returned() {
    let harness = TestHarness::new(
        ScriptedTranscriptionEngine::text("hello world"),
        FakeTextService::new(),
    );
    let id = job_id("done");
    harness.stage_audio(&id).await;
    let completed = accepted(
        harness
            .service
            .submit(id.clone(), SpeakerSettings::disabled(), true)
            .await
            .unwrap(),
    );

    let resumed = harness.service.resume(&id).await.unwrap();

    assert_eq!(resumed, completed);
    assert_eq!(harness.engine.calls(), 1);
}

#[tokio::test]
async fn given_missing_audio_when_pipeline_runs_then_job_fails_and_resumes_after_upload() {
    let harness = TestHarness::new(
        ScriptedTranscriptionEngine::text("hello world"),
        FakeTextService::new(),
    );
    let id = job_id("noaudio");

    let result = harness
        .service
        .submit(id.clone(), SpeakerSettings::disabled(), true)
        .await;

    assert!(matches!(
        result,
        Err(JobServiceError::Pipeline(PipelineError::AudioMissing(_)))
    ));
    let failed = harness.service.get_status(&id).await.unwrap();
    assert_eq!(failed.status, JobStatus::Failed);
    assert_eq!(failed.failed_after, Some(JobStatus::Init));
    assert!(failed.error.is_some());

    harness.stage_audio(&id).await;
    let resumed = harness.service.resume(&id).await.unwrap();

    assert_eq!(resumed.status, JobStatus::Completed);
    assert!(resumed.error.is_none());
    assert!(resumed.failed_after.is_none());
}

#[tokio::test]
async fn given_transcription_failing_past_retry_budget_when_resuming_then_restarts_at_transcribing() {
    let engine = ScriptedTranscriptionEngine::text("hello world").failing_first(vec![
        TranscriptionError::ServiceUnavailable("gpu busy".to_string()),
        TranscriptionError::ServiceUnavailable("gpu busy".to_string()),
        TranscriptionError::ServiceUnavailable("gpu busy".to_string()),
    ]);
    let harness = TestHarness::new(engine, FakeTextService::new());
    let id = job_id("flaky");
    harness.stage_audio(&id).await;

    let result = harness
        .service
        .submit(id.clone(), SpeakerSettings::disabled(), true)
        .await;

    assert!(result.is_err());
    assert_eq!(harness.engine.calls(), 3);
    let failed = harness.service.get_status(&id).await.unwrap();
    assert_eq!(failed.status, JobStatus::Failed);
    assert_eq!(failed.failed_after, Some(JobStatus::FetchingAudio));
    assert!(failed.data.text.is_none());

    let resumed = harness.service.resume(&id).await.unwrap();

    assert_eq!(resumed.status, JobStatus::Completed);
    assert_eq!(harness.engine.calls(), 4);
    assert_eq!(
        harness.repository.saved_statuses(&id),
        vec![
            JobStatus::Init,
            JobStatus::FetchingAudio,
            JobStatus::Failed,
            JobStatus::Transcribing,
            JobStatus::Summarizing,
            JobStatus::Completed,
        ]
    );
}

#[tokio::test]
async fn given_rate_limited_transcription_when_retried_then_job_completes() {
    let engine = ScriptedTranscriptionEngine::text("hello world")
        .failing_first(vec![TranscriptionError::RateLimited]);
    let harness = TestHarness::new(engine, FakeTextService::new());
    let id = job_id("ratelimited");
    harness.stage_audio(&id).await;

    let job = accepted(
        harness
            .service
            .submit(id.clone(), SpeakerSettings::disabled(), true)
            .await
            .unwrap(),
    );

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(harness.engine.calls(), 2);
}

#[tokio::test]
async fn given_diarized_output_when_speakers_enabled_then_speaker_transcript_and_names_are_stored() {
    let output = TranscriptionOutput {
        segments: vec![
            TranscriptSegment {
                text: "hi there".to_string(),
                speaker: Some("SPEAKER_00".to_string()),
                words: vec![
                    WordEntry::new("hi", Some("SPEAKER_00")),
                    WordEntry::new("there", Some("SPEAKER_00")),
                ],
            },
            TranscriptSegment {
                text: "ok".to_string(),
                speaker: Some("SPEAKER_01".to_string()),
                words: vec![WordEntry::new("ok", Some("SPEAKER_01"))],
            },
        ],
        text: None,
        language: Some("en".to_string()),
        elapsed: Duration::from_secs(2),
    };
    let harness = TestHarness::new(
        ScriptedTranscriptionEngine::returning(output),
        FakeTextService::naming(&[("SPEAKER_00", "Ana Lund")]),
    );
    let id = job_id("diarized");
    harness.stage_audio(&id).await;

    let job = accepted(
        harness
            .service
            .submit(id.clone(), SpeakerSettings::default(), true)
            .await
            .unwrap(),
    );

    let request = harness.engine.last_request().unwrap();
    assert!(request.enable_speakers);
    assert_eq!(request.num_speakers, 2);
    assert_eq!(job.data.text.as_deref(), Some("Hi there ok"));
    assert_eq!(
        job.data.speaker_transcript.as_deref(),
        Some("SPEAKER_00: hi there\nSPEAKER_01: ok")
    );
    let mappings = job.data.speaker_mappings.unwrap();
    assert_eq!(mappings.get("SPEAKER_00").map(String::as_str), Some("Ana Lund"));
    assert_eq!(mappings.len(), 1);
}

#[tokio::test]
async fn given_upload_with_metadata_when_pipeline_runs_then_title_and_author_are_recorded() {
    let harness = TestHarness::new(
        ScriptedTranscriptionEngine::text("hello world"),
        FakeTextService::new(),
    );
    let metadata = AudioMetadata {
        title: Some("Episode 12".to_string()),
        author: Some("Radio Nord".to_string()),
    };

    let outcome = harness
        .service
        .stage_upload(bytes::Bytes::from_static(b"episode twelve bytes"), metadata)
        .await
        .unwrap();
    let id = match outcome {
        murmur::application::services::UploadOutcome::Stored { job_id, .. } => job_id,
        other => panic!("unexpected upload outcome: {:?}", other),
    };

    let job = accepted(
        harness
            .service
            .submit(id.clone(), SpeakerSettings::disabled(), true)
            .await
            .unwrap(),
    );

    assert_eq!(job.data.title.as_deref(), Some("Episode 12"));
    assert_eq!(job.data.author.as_deref(), Some("Radio Nord"));
}
