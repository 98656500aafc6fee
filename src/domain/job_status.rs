use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Pipeline state of a job. A persisted status names the last stage that completed
/// successfully; the next stage to run is [`JobStatus::next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    #[serde(alias = "initiated")]
    Init,
    #[serde(alias = "downloading_audio")]
    FetchingAudio,
    Transcribing,
    Summarizing,
    Completed,
    Failed,
}

impl JobStatus {
    pub const ALL: [JobStatus; 6] = [
        JobStatus::Init,
        JobStatus::FetchingAudio,
        JobStatus::Transcribing,
        JobStatus::Summarizing,
        JobStatus::Completed,
        JobStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Init => "Init",
            JobStatus::FetchingAudio => "FetchingAudio",
            JobStatus::Transcribing => "Transcribing",
            JobStatus::Summarizing => "Summarizing",
            JobStatus::Completed => "Completed",
            JobStatus::Failed => "Failed",
        }
    }

    /// The stage that runs after this one. `None` for the terminal states.
    pub fn next(&self) -> Option<JobStatus> {
        match self {
            JobStatus::Init => Some(JobStatus::FetchingAudio),
            JobStatus::FetchingAudio => Some(JobStatus::Transcribing),
            JobStatus::Transcribing => Some(JobStatus::Summarizing),
            JobStatus::Summarizing => Some(JobStatus::Completed),
            JobStatus::Completed | JobStatus::Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// True once the transcript has been produced and committed.
    pub fn has_transcript(&self) -> bool {
        matches!(
            self,
            JobStatus::Transcribing | JobStatus::Summarizing | JobStatus::Completed
        )
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Init" | "initiated" => Ok(JobStatus::Init),
            "FetchingAudio" | "downloading_audio" => Ok(JobStatus::FetchingAudio),
            "Transcribing" => Ok(JobStatus::Transcribing),
            "Summarizing" => Ok(JobStatus::Summarizing),
            "Completed" => Ok(JobStatus::Completed),
            "Failed" => Ok(JobStatus::Failed),
            _ => Err(format!("Invalid job status: {}", s)),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
