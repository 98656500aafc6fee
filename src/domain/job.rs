use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{JobId, JobStatus, SpeakerSettings};

/// Speaker label (e.g. `SPEAKER_00`) to display name.
pub type SpeakerMappings = BTreeMap<String, String>;

/// The persisted state of one pipeline job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub status: JobStatus,
    #[serde(default)]
    pub data: JobData,
    #[serde(default)]
    pub speaker_settings: SpeakerSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Last status committed before the job failed; resume restarts from here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_after: Option<JobStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stage outputs. Stages only ever set fields; nothing here is removed by a later stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_mappings: Option<SpeakerMappings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Seconds spent in transcription, cleaning and summarization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Best-effort descriptive metadata attached to an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

impl JobRecord {
    pub fn new(id: JobId, speaker_settings: SpeakerSettings) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: JobStatus::Init,
            data: JobData::default(),
            speaker_settings,
            error: None,
            failed_after: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A completed job with a transcript; resubmitting it is a no-op.
    pub fn has_completed_transcript(&self) -> bool {
        self.status == JobStatus::Completed
            && self.data.text.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Status to continue from: a failed job resumes after its last committed stage.
    pub fn resume_point(&self) -> JobStatus {
        match self.status {
            JobStatus::Failed => self.failed_after.unwrap_or(JobStatus::Init),
            other => other,
        }
    }

    pub fn mark_failed(&mut self, last_committed: JobStatus, message: String) {
        self.status = JobStatus::Failed;
        self.failed_after = Some(last_committed);
        self.error = Some(message);
        self.touch();
    }

    pub fn advance_to(&mut self, status: JobStatus) {
        self.status = status;
        self.error = None;
        self.failed_after = None;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
