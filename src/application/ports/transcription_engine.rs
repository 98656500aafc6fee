use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{StoragePath, TranscriptSegment};

use super::{ErrorClass, Retryable};

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionRequest {
    pub audio: StoragePath,
    pub enable_speakers: bool,
    pub num_speakers: u8,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptionOutput {
    pub segments: Vec<TranscriptSegment>,
    /// Full transcript when the service returns one; otherwise derived from the segments.
    pub text: Option<String>,
    pub language: Option<String>,
    pub elapsed: Duration,
}

impl TranscriptionOutput {
    pub fn plain_text(&self) -> String {
        match &self.text {
            Some(text) => text.trim().to_string(),
            None => self
                .segments
                .iter()
                .map(|s| s.text.trim())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Speech recognition and diarization service. One call per job.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe(
        &self,
        request: &TranscriptionRequest,
    ) -> Result<TranscriptionOutput, TranscriptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("transcription rate limited")]
    RateLimited,
    #[error("transcription timed out after {0:?}")]
    Timeout(Duration),
    #[error("transcription service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("invalid transcription response: {0}")]
    InvalidResponse(String),
    #[error("audio unavailable: {0}")]
    AudioUnavailable(String),
    #[error("transcription rejected: {0}")]
    Rejected(String),
}

impl Retryable for TranscriptionError {
    fn class(&self) -> ErrorClass {
        match self {
            TranscriptionError::RateLimited => ErrorClass::RateLimited,
            TranscriptionError::Timeout(_) => ErrorClass::Timeout,
            TranscriptionError::ServiceUnavailable(_) | TranscriptionError::InvalidResponse(_) => {
                ErrorClass::Transient
            }
            TranscriptionError::AudioUnavailable(_) | TranscriptionError::Rejected(_) => {
                ErrorClass::Fatal
            }
        }
    }

    fn timed_out(after: Duration) -> Self {
        TranscriptionError::Timeout(after)
    }
}
