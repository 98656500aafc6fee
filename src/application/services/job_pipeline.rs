use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;

use super::retry::{RetryPolicy, invoke_with_retry};
use super::speaker_merge::{has_speaker_labels, merge_speaker_segments, render_speaker_transcript};
use super::transcript_processor::TranscriptProcessor;
use crate::application::ports::{
    JobRepository, MetadataProvider, RepositoryError, StagingStore, StagingStoreError,
    TextServiceError, TranscriptionEngine, TranscriptionError, TranscriptionRequest,
};
use crate::domain::{JobId, JobRecord, JobStatus, StoragePath};

/// Drives a job through its stages, committing the record after each one.
pub struct JobPipeline {
    repository: Arc<dyn JobRepository>,
    staging_store: Arc<dyn StagingStore>,
    transcription_engine: Arc<dyn TranscriptionEngine>,
    metadata_provider: Arc<dyn MetadataProvider>,
    processor: TranscriptProcessor,
    transcription_retry: RetryPolicy,
}

impl JobPipeline {
    pub fn new(
        repository: Arc<dyn JobRepository>,
        staging_store: Arc<dyn StagingStore>,
        transcription_engine: Arc<dyn TranscriptionEngine>,
        metadata_provider: Arc<dyn MetadataProvider>,
        processor: TranscriptProcessor,
        transcription_retry: RetryPolicy,
    ) -> Self {
        Self {
            repository,
            staging_store,
            transcription_engine,
            metadata_provider,
            processor,
            transcription_retry,
        }
    }

    /// Runs `job` forward from its resume point until it is Completed.
    ///
    /// On a stage error the job is committed as Failed with the last successful status kept
    /// in `failed_after`, and the error is returned. Nothing a failed stage computed is saved.
    pub async fn run(&self, job: JobRecord) -> Result<JobRecord, PipelineError> {
        let span = tracing::info_span!("pipeline_job", job_id = %job.id);
        self.run_stages(job).instrument(span).await
    }

    async fn run_stages(&self, mut job: JobRecord) -> Result<JobRecord, PipelineError> {
        if job.status == JobStatus::Failed {
            let resume_point = job.resume_point();
            tracing::info!(resume_from = %resume_point, "Resuming failed job");
            job.status = resume_point;
        }

        while !job.status.is_terminal() {
            let committed = job.status;
            match self.advance(job.clone()).await {
                Ok(advanced) => job = advanced,
                Err(e) => {
                    tracing::error!(stage = ?committed.next(), error = %e, "Pipeline stage failed");
                    job.mark_failed(committed, e.to_string());
                    if let Err(save_err) = self.repository.save(&job).await {
                        tracing::error!(error = %save_err, "Failed to record job failure");
                    }
                    return Err(e);
                }
            }
        }

        tracing::info!(status = %job.status, "Pipeline finished");
        Ok(job)
    }

    /// Runs the stage after `job.status` and commits the result. Terminal jobs are returned
    /// unchanged.
    pub async fn advance(&self, mut job: JobRecord) -> Result<JobRecord, PipelineError> {
        let Some(next) = job.status.next() else {
            return Ok(job);
        };

        tracing::debug!(from = %job.status, to = %next, "Job status transition");
        match next {
            JobStatus::FetchingAudio => self.fetch_audio(&mut job).await?,
            JobStatus::Transcribing => self.transcribe(&mut job).await?,
            JobStatus::Summarizing => self.summarize(&mut job).await?,
            JobStatus::Completed => self.release_audio(&job).await,
            JobStatus::Init | JobStatus::Failed => {}
        }

        job.advance_to(next);
        self.repository
            .save(&job)
            .await
            .map_err(PipelineError::Repository)?;
        Ok(job)
    }

    async fn fetch_audio(&self, job: &mut JobRecord) -> Result<(), PipelineError> {
        self.require_audio(&job.id).await?;

        if job.data.title.is_none() {
            match self.metadata_provider.lookup(&job.id).await {
                Ok(Some(metadata)) => {
                    job.data.title = metadata.title;
                    if job.data.author.is_none() {
                        job.data.author = metadata.author;
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "Audio metadata unavailable"),
            }
        }

        Ok(())
    }

    async fn transcribe(&self, job: &mut JobRecord) -> Result<(), PipelineError> {
        let audio = self.require_audio(&job.id).await?;
        let settings = job.speaker_settings;
        let request = TranscriptionRequest {
            audio,
            enable_speakers: settings.enable_speakers,
            num_speakers: settings.num_speakers,
        };

        let engine = self.transcription_engine.as_ref();
        let request = &request;
        let output = invoke_with_retry(&self.transcription_retry, "transcribe", move || {
            engine.transcribe(request)
        })
        .await
        .map_err(PipelineError::Transcription)?;

        tracing::info!(
            segments = output.segments.len(),
            language = ?output.language,
            elapsed_ms = output.elapsed.as_millis() as u64,
            "Transcription finished"
        );

        let plain = output.plain_text();
        let speaker_raw = (settings.enable_speakers && has_speaker_labels(&output.segments))
            .then(|| render_speaker_transcript(&merge_speaker_segments(&output.segments)));

        let cleaning_started = Instant::now();
        let text = self
            .processor
            .clean_transcript(&plain)
            .await
            .map_err(PipelineError::Cleaning)?;

        let speaker_transcript = match speaker_raw {
            Some(raw) if raw != plain => {
                let cleaned = self
                    .processor
                    .clean_speaker_transcript(&raw)
                    .await
                    .map_err(PipelineError::Cleaning)?;
                if !cleaned.speaker_mappings.is_empty() {
                    job.data.speaker_mappings = Some(cleaned.speaker_mappings);
                }
                cleaned.cleaned_transcript
            }
            _ => text.clone(),
        };

        let elapsed = output.elapsed + cleaning_started.elapsed();
        job.data.text = Some(text);
        job.data.speaker_transcript = Some(speaker_transcript);
        if output.language.is_some() {
            job.data.language = output.language;
        }
        job.data.processing_time = Some(elapsed.as_secs_f64());
        Ok(())
    }

    async fn summarize(&self, job: &mut JobRecord) -> Result<(), PipelineError> {
        let Some(text) = job.data.text.clone().filter(|t| !t.trim().is_empty()) else {
            tracing::info!("No transcript to summarize");
            return Ok(());
        };

        let started = Instant::now();
        match self.processor.summarize(&text).await {
            Ok(summary) => job.data.summary = Some(summary),
            Err(e) => tracing::warn!(error = %e, "Summarization failed, completing without summary"),
        }

        let total = job.data.processing_time.unwrap_or(0.0) + started.elapsed().as_secs_f64();
        job.data.processing_time = Some(total);
        Ok(())
    }

    async fn release_audio(&self, job: &JobRecord) {
        for path in [StoragePath::audio(&job.id), StoragePath::metadata(&job.id)] {
            match self.staging_store.delete(&path).await {
                Ok(()) | Err(StagingStoreError::NotFound(_)) => {}
                Err(e) => tracing::warn!(error = %e, path = %path, "Failed to release staged file"),
            }
        }
    }

    async fn require_audio(&self, id: &JobId) -> Result<StoragePath, PipelineError> {
        let audio = StoragePath::audio(id);
        let present = self
            .staging_store
            .exists(&audio)
            .await
            .map_err(PipelineError::Staging)?;
        if !present {
            return Err(PipelineError::AudioMissing(id.clone()));
        }
        Ok(audio)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("audio for job {0} is not in the staging store")]
    AudioMissing(JobId),
    #[error("transcription: {0}")]
    Transcription(TranscriptionError),
    #[error("cleaning: {0}")]
    Cleaning(TextServiceError),
    #[error("staging store: {0}")]
    Staging(StagingStoreError),
    #[error("repository: {0}")]
    Repository(RepositoryError),
}
