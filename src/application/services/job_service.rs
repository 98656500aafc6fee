use std::io;
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream;

use super::active_jobs::ActiveJobs;
use super::job_pipeline::{JobPipeline, PipelineError};
use crate::application::ports::{JobRepository, RepositoryError, StagingStore, StagingStoreError};
use crate::domain::{
    AudioMetadata, JobId, JobRecord, JobStatus, SpeakerMappings, SpeakerSettings, StoragePath,
};

/// Statuses a job can be left in by a crash or redeploy.
const INTERRUPTED: [JobStatus; 4] = [
    JobStatus::Init,
    JobStatus::FetchingAudio,
    JobStatus::Transcribing,
    JobStatus::Summarizing,
];

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Accepted(JobRecord),
    /// The job already finished with a transcript; nothing was scheduled.
    TranscriptExists(JobRecord),
}

impl SubmitOutcome {
    pub fn record(&self) -> &JobRecord {
        match self {
            SubmitOutcome::Accepted(job) | SubmitOutcome::TranscriptExists(job) => job,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Stored { job_id: JobId, bytes: u64 },
    TranscriptExists { job_id: JobId },
}

pub struct JobService {
    repository: Arc<dyn JobRepository>,
    staging_store: Arc<dyn StagingStore>,
    pipeline: Arc<JobPipeline>,
    active: ActiveJobs,
}

impl JobService {
    pub fn new(
        repository: Arc<dyn JobRepository>,
        staging_store: Arc<dyn StagingStore>,
        pipeline: Arc<JobPipeline>,
    ) -> Self {
        Self {
            repository,
            staging_store,
            pipeline,
            active: ActiveJobs::new(),
        }
    }

    pub fn active_jobs(&self) -> &ActiveJobs {
        &self.active
    }

    /// Stores uploaded audio under its content hash along with a metadata sidecar.
    #[tracing::instrument(skip_all, fields(bytes = content.len()))]
    pub async fn stage_upload(
        &self,
        content: Bytes,
        metadata: AudioMetadata,
    ) -> Result<UploadOutcome, JobServiceError> {
        let job_id = JobId::from_content(&content);

        if let Some(job) = self.load(&job_id).await? {
            if job.has_completed_transcript() {
                tracing::info!(job_id = %job_id, "Upload matches a completed job");
                return Ok(UploadOutcome::TranscriptExists { job_id });
            }
        }

        let size = content.len() as u64;
        let bytes = self
            .staging_store
            .store(
                &StoragePath::audio(&job_id),
                stream::once(async move { Ok::<_, io::Error>(content) }).boxed(),
                Some(size),
            )
            .await
            .map_err(JobServiceError::Staging)?;

        let sidecar = serde_json::to_vec(&metadata)
            .map_err(|e| JobServiceError::Staging(StagingStoreError::UploadFailed(e.to_string())))?;
        let sidecar_len = sidecar.len() as u64;
        self.staging_store
            .store(
                &StoragePath::metadata(&job_id),
                stream::once(async move { Ok::<_, io::Error>(Bytes::from(sidecar)) }).boxed(),
                Some(sidecar_len),
            )
            .await
            .map_err(JobServiceError::Staging)?;

        tracing::info!(job_id = %job_id, bytes, "Audio staged");
        Ok(UploadOutcome::Stored { job_id, bytes })
    }

    /// Creates the job if it does not exist. With `chained` the pipeline runs to completion
    /// before returning; otherwise only the Init record is committed.
    ///
    /// Speaker settings of an existing job are replaced only while no transcript exists.
    #[tracing::instrument(skip(self), fields(job_id = %job_id))]
    pub async fn submit(
        &self,
        job_id: JobId,
        speaker_settings: SpeakerSettings,
        chained: bool,
    ) -> Result<SubmitOutcome, JobServiceError> {
        let _claim = self
            .active
            .claim(&job_id)
            .ok_or_else(|| JobServiceError::AlreadyRunning(job_id.clone()))?;

        let job = match self.load(&job_id).await? {
            Some(job) if job.has_completed_transcript() => {
                return Ok(SubmitOutcome::TranscriptExists(job));
            }
            Some(mut job) => {
                if !job.resume_point().has_transcript() && job.speaker_settings != speaker_settings
                {
                    job.speaker_settings = speaker_settings;
                    job.touch();
                    self.save(&job).await?;
                }
                job
            }
            None => {
                let job = JobRecord::new(job_id, speaker_settings);
                self.save(&job).await?;
                tracing::info!("Job created");
                job
            }
        };

        if !chained {
            return Ok(SubmitOutcome::Accepted(job));
        }

        let job = self
            .pipeline
            .run(job)
            .await
            .map_err(JobServiceError::Pipeline)?;
        Ok(SubmitOutcome::Accepted(job))
    }

    /// Continues a job from the stage after its last committed status. A Completed job is
    /// returned as is.
    #[tracing::instrument(skip(self), fields(job_id = %job_id))]
    pub async fn resume(&self, job_id: &JobId) -> Result<JobRecord, JobServiceError> {
        let _claim = self
            .active
            .claim(job_id)
            .ok_or_else(|| JobServiceError::AlreadyRunning(job_id.clone()))?;

        let job = self.require(job_id).await?;
        if job.status == JobStatus::Completed {
            tracing::debug!("Job already completed");
            return Ok(job);
        }

        self.pipeline
            .run(job)
            .await
            .map_err(JobServiceError::Pipeline)
    }

    pub async fn get_status(&self, job_id: &JobId) -> Result<JobRecord, JobServiceError> {
        self.require(job_id).await
    }

    #[tracing::instrument(skip(self, mappings), fields(job_id = %job_id, speakers = mappings.len()))]
    pub async fn update_speaker_mappings(
        &self,
        job_id: &JobId,
        mappings: SpeakerMappings,
    ) -> Result<JobRecord, JobServiceError> {
        let _claim = self
            .active
            .claim(job_id)
            .ok_or_else(|| JobServiceError::AlreadyRunning(job_id.clone()))?;

        let mut job = self.require(job_id).await?;
        job.data.speaker_mappings = Some(mappings);
        job.touch();
        self.save(&job).await?;
        tracing::info!("Speaker mappings updated");
        Ok(job)
    }

    /// Removes the job record and any staged files.
    #[tracing::instrument(skip(self), fields(job_id = %job_id))]
    pub async fn delete(&self, job_id: &JobId) -> Result<(), JobServiceError> {
        let _claim = self
            .active
            .claim(job_id)
            .ok_or_else(|| JobServiceError::AlreadyRunning(job_id.clone()))?;

        self.require(job_id).await?;

        for path in [StoragePath::audio(job_id), StoragePath::metadata(job_id)] {
            match self.staging_store.delete(&path).await {
                Ok(()) | Err(StagingStoreError::NotFound(_)) => {}
                Err(e) => return Err(JobServiceError::Staging(e)),
            }
        }

        self.repository
            .delete(job_id)
            .await
            .map_err(JobServiceError::Repository)?;
        tracing::info!("Job deleted");
        Ok(())
    }

    /// Ids of jobs that stopped before reaching a terminal status. Failed jobs are left for
    /// an explicit resume.
    pub async fn interrupted_jobs(&self) -> Result<Vec<JobId>, JobServiceError> {
        let mut ids = Vec::new();
        for status in INTERRUPTED {
            let jobs = self
                .repository
                .list_by_status(status)
                .await
                .map_err(JobServiceError::Repository)?;
            ids.extend(jobs.into_iter().map(|job| job.id));
        }
        Ok(ids)
    }

    async fn load(&self, job_id: &JobId) -> Result<Option<JobRecord>, JobServiceError> {
        self.repository
            .load(job_id)
            .await
            .map_err(JobServiceError::Repository)
    }

    async fn require(&self, job_id: &JobId) -> Result<JobRecord, JobServiceError> {
        self.load(job_id)
            .await?
            .ok_or_else(|| JobServiceError::NotFound(job_id.clone()))
    }

    async fn save(&self, job: &JobRecord) -> Result<(), JobServiceError> {
        self.repository
            .save(job)
            .await
            .map_err(JobServiceError::Repository)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobServiceError {
    #[error("job {0} not found")]
    NotFound(JobId),
    #[error("job {0} is already running")]
    AlreadyRunning(JobId),
    #[error("{0}")]
    Pipeline(PipelineError),
    #[error("repository: {0}")]
    Repository(RepositoryError),
    #[error("staging store: {0}")]
    Staging(StagingStoreError),
}
