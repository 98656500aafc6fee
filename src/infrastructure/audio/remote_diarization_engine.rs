use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::response_status::{classify_send_error, classify_status};
use crate::application::ports::{
    TranscriptionEngine, TranscriptionError, TranscriptionOutput, TranscriptionRequest,
};
use crate::domain::TranscriptSegment;
use crate::infrastructure::text_processing::normalize_transcript;

/// GPU transcription service with alignment and diarization. The service reads the audio
/// from the shared staging store itself; only the object key is sent.
pub struct RemoteDiarizationEngine {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    request_timeout: Duration,
}

#[derive(Serialize)]
struct DiarizationRequest<'a> {
    audio_ref: &'a str,
    enable_speakers: bool,
    num_speakers: u8,
}

#[derive(Deserialize)]
struct DiarizationResponse {
    #[serde(default)]
    segments: Vec<TranscriptSegment>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    elapsed_seconds: Option<f64>,
}

impl RemoteDiarizationEngine {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, TranscriptionError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| TranscriptionError::Rejected(format!("http client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/transcribe", base_url.trim_end_matches('/')),
            api_key: api_key.filter(|k| !k.is_empty()),
            request_timeout,
        })
    }
}

#[async_trait]
impl TranscriptionEngine for RemoteDiarizationEngine {
    #[tracing::instrument(skip_all, fields(audio = %request.audio, speakers = request.enable_speakers))]
    async fn transcribe(
        &self,
        request: &TranscriptionRequest,
    ) -> Result<TranscriptionOutput, TranscriptionError> {
        let started = Instant::now();
        let body = DiarizationRequest {
            audio_ref: request.audio.as_str(),
            enable_speakers: request.enable_speakers,
            num_speakers: request.num_speakers,
        };

        let mut http_request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            http_request = http_request.bearer_auth(key);
        }

        let response = http_request
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

        let result: DiarizationResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::InvalidResponse(e.to_string()))?;

        let segments: Vec<TranscriptSegment> = result
            .segments
            .into_iter()
            .map(|mut segment| {
                segment.text = normalize_transcript(&segment.text);
                segment
            })
            .collect();

        let elapsed = result
            .elapsed_seconds
            .filter(|s| s.is_finite() && *s >= 0.0)
            .map(Duration::from_secs_f64)
            .unwrap_or_else(|| started.elapsed());

        tracing::info!(
            segments = segments.len(),
            language = ?result.language,
            "Remote transcription completed"
        );

        Ok(TranscriptionOutput {
            segments,
            text: result.text.map(|t| normalize_transcript(&t)),
            language: result.language,
            elapsed,
        })
    }
}
