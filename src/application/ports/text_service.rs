use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::SpeakerMappings;

use super::{ErrorClass, Retryable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextTask {
    CleanTranscript,
    CleanSpeakerTranscript,
    Summarize,
    CombineSummaries,
}

impl TextTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextTask::CleanTranscript => "clean_transcript",
            TextTask::CleanSpeakerTranscript => "clean_speaker_transcript",
            TextTask::Summarize => "summarize",
            TextTask::CombineSummaries => "combine_summaries",
        }
    }

    /// Cleaning tasks answer with a JSON object; summaries are free text.
    pub fn expects_json(&self) -> bool {
        matches!(
            self,
            TextTask::CleanTranscript | TextTask::CleanSpeakerTranscript
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TextRequest<'a> {
    pub task: TextTask,
    pub prompt: &'a str,
    pub content: &'a str,
}

/// LLM text processing service. Returns the raw generated text; structured answers are
/// decoded by the caller with [`CleanedText::parse`] / [`CleanedSpeakerTranscript::parse`].
#[async_trait]
pub trait TextService: Send + Sync {
    async fn invoke(&self, request: TextRequest<'_>) -> Result<String, TextServiceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TextServiceError {
    #[error("rate limited")]
    RateLimited,
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("request rejected: {0}")]
    Rejected(String),
}

impl Retryable for TextServiceError {
    fn class(&self) -> ErrorClass {
        match self {
            TextServiceError::RateLimited => ErrorClass::RateLimited,
            TextServiceError::Timeout(_) => ErrorClass::Timeout,
            TextServiceError::ApiRequestFailed(_) | TextServiceError::MalformedResponse(_) => {
                ErrorClass::Transient
            }
            TextServiceError::Rejected(_) => ErrorClass::Fatal,
        }
    }

    fn timed_out(after: Duration) -> Self {
        TextServiceError::Timeout(after)
    }
}

/// Models answer either with one string or with a list of paragraphs.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TextOrParagraphs {
    Text(String),
    Paragraphs(Vec<String>),
}

impl TextOrParagraphs {
    fn into_text(self) -> String {
        match self {
            TextOrParagraphs::Text(text) => text,
            TextOrParagraphs::Paragraphs(paragraphs) => paragraphs
                .into_iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedText {
    pub cleaned_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedSpeakerTranscript {
    pub cleaned_transcript: String,
    pub speaker_mappings: SpeakerMappings,
}

#[derive(Deserialize)]
struct CleanedTextPayload {
    cleaned_text: TextOrParagraphs,
}

#[derive(Deserialize)]
struct CleanedSpeakerPayload {
    cleaned_transcript: TextOrParagraphs,
    #[serde(default)]
    speaker_ids: Vec<String>,
    #[serde(default)]
    speaker_names: Vec<String>,
}

impl CleanedText {
    pub fn parse(raw: &str) -> Result<Self, TextServiceError> {
        let payload: CleanedTextPayload = decode_json(raw)?;
        Ok(Self {
            cleaned_text: payload.cleaned_text.into_text(),
        })
    }
}

impl CleanedSpeakerTranscript {
    pub fn parse(raw: &str) -> Result<Self, TextServiceError> {
        let payload: CleanedSpeakerPayload = decode_json(raw)?;

        if payload.speaker_ids.len() != payload.speaker_names.len() {
            return Err(TextServiceError::MalformedResponse(format!(
                "speaker_ids has {} entries but speaker_names has {}",
                payload.speaker_ids.len(),
                payload.speaker_names.len()
            )));
        }

        let speaker_mappings = payload
            .speaker_ids
            .into_iter()
            .zip(payload.speaker_names)
            .filter(|(id, name)| !id.trim().is_empty() && !name.trim().is_empty())
            .map(|(id, name)| (id.trim().to_string(), name.trim().to_string()))
            .collect();

        Ok(Self {
            cleaned_transcript: payload.cleaned_transcript.into_text(),
            speaker_mappings,
        })
    }
}

fn decode_json<T: DeserializeOwned>(raw: &str) -> Result<T, TextServiceError> {
    serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| TextServiceError::MalformedResponse(e.to_string()))
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
