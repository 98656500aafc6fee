use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;

use super::response_status::{classify_send_error, classify_status};
use crate::application::ports::{
    StagingStore, StagingStoreError, TranscriptionEngine, TranscriptionError,
    TranscriptionOutput, TranscriptionRequest,
};
use crate::domain::TranscriptSegment;
use crate::infrastructure::text_processing::normalize_transcript;

/// OpenAI-compatible `/audio/transcriptions` endpoint. Uploads the staged audio bytes and
/// asks for `verbose_json`; the endpoint has no diarization, so segments carry no speaker.
pub struct OpenAiWhisperEngine {
    client: reqwest::Client,
    staging_store: Arc<dyn StagingStore>,
    api_key: String,
    base_url: String,
    model: String,
    request_timeout: Duration,
}

#[derive(Deserialize)]
struct VerboseTranscription {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    segments: Vec<VerboseSegment>,
}

#[derive(Deserialize)]
struct VerboseSegment {
    text: String,
}

impl OpenAiWhisperEngine {
    pub fn new(
        staging_store: Arc<dyn StagingStore>,
        api_key: String,
        base_url: Option<String>,
        model: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, TranscriptionError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| TranscriptionError::Rejected(format!("http client: {}", e)))?;

        Ok(Self {
            client,
            staging_store,
            api_key,
            base_url: base_url
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
                .trim_end_matches('/')
                .to_string(),
            model: model.unwrap_or_else(|| "whisper-1".to_string()),
            request_timeout,
        })
    }
}

#[async_trait]
impl TranscriptionEngine for OpenAiWhisperEngine {
    #[tracing::instrument(skip_all, fields(audio = %request.audio, model = %self.model))]
    async fn transcribe(
        &self,
        request: &TranscriptionRequest,
    ) -> Result<TranscriptionOutput, TranscriptionError> {
        let started = Instant::now();
        let audio = self
            .staging_store
            .fetch(&request.audio)
            .await
            .map_err(|e| match e {
                StagingStoreError::NotFound(path) => TranscriptionError::AudioUnavailable(path),
                other => TranscriptionError::ServiceUnavailable(other.to_string()),
            })?;

        let file_name = request
            .audio
            .as_str()
            .rsplit('/')
            .next()
            .unwrap_or("audio")
            .to_string();
        let file_part = multipart::Part::bytes(audio)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| TranscriptionError::Rejected(format!("mime: {}", e)))?;

        let form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .part("file", file_part);

        tracing::debug!("Sending audio to Whisper endpoint");

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| classify_send_error(e, self.request_timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(classify_status(status, body, self.request_timeout));
        }

        let result: VerboseTranscription = response
            .json()
            .await
            .map_err(|e| TranscriptionError::InvalidResponse(e.to_string()))?;

        let segments = result
            .segments
            .iter()
            .map(|s| TranscriptSegment::new(normalize_transcript(&s.text)))
            .filter(|s| !s.text.is_empty())
            .collect();

        tracing::info!(chars = result.text.len(), "Whisper transcription completed");

        Ok(TranscriptionOutput {
            segments,
            text: Some(normalize_transcript(&result.text)),
            language: result.language,
            elapsed: started.elapsed(),
        })
    }
}
