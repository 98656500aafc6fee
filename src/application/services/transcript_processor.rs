use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};

use super::chunking::{chunk_lines, chunk_text, merge_chunks, merge_lines};
use super::retry::{RetryPolicy, invoke_with_retry};
use super::{count_tokens, prompts};
use crate::application::ports::{
    CleanedSpeakerTranscript, CleanedText, TextRequest, TextService, TextServiceError, TextTask,
};
use crate::domain::{SpeakerMappings, TextChunk};

/// Sizes and pacing for text-service work.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingLimits {
    pub cleaning_chunk_tokens: usize,
    /// Concurrent cleaning requests per transcript.
    pub cleaning_concurrency: usize,
    pub speaker_chunk_tokens: usize,
    pub summary_token_limit: usize,
    /// Fraction of `summary_token_limit` above which a transcript is summarized in batches.
    pub batch_threshold_ratio: f64,
    pub summary_chunk_tokens: usize,
    /// Texts shorter than this are returned untouched instead of being sent out.
    pub min_text_chars: usize,
    pub speaker_chunk_delay: Duration,
    pub summary_batch_delay: Duration,
}

impl Default for ProcessingLimits {
    fn default() -> Self {
        Self {
            cleaning_chunk_tokens: 60_000,
            cleaning_concurrency: 8,
            speaker_chunk_tokens: 90_000,
            summary_token_limit: 800_000,
            batch_threshold_ratio: 0.8,
            summary_chunk_tokens: 400_000,
            min_text_chars: 100,
            speaker_chunk_delay: Duration::from_secs(1),
            summary_batch_delay: Duration::from_secs(2),
        }
    }
}

/// Cleans and summarizes transcripts through the text service.
pub struct TranscriptProcessor {
    text_service: Arc<dyn TextService>,
    retry_policy: RetryPolicy,
    limits: ProcessingLimits,
}

impl TranscriptProcessor {
    pub fn new(
        text_service: Arc<dyn TextService>,
        retry_policy: RetryPolicy,
        limits: ProcessingLimits,
    ) -> Self {
        Self {
            text_service,
            retry_policy,
            limits,
        }
    }

    /// Cleans `text` chunk by chunk. Chunks are processed concurrently and reassembled in
    /// their original order; any chunk that still fails after retries fails the whole call.
    #[tracing::instrument(skip_all, fields(chars = text.len()))]
    pub async fn clean_transcript(&self, text: &str) -> Result<String, TextServiceError> {
        if self.is_short(text) {
            return Ok(text.to_string());
        }

        let chunks = chunk_text(text, self.limits.cleaning_chunk_tokens);
        tracing::debug!(chunks = chunks.len(), "Cleaning transcript");

        let cleaned: Vec<TextChunk> = stream::iter(chunks.into_iter().map(|chunk| async move {
            let cleaned = self
                .request(
                    TextTask::CleanTranscript,
                    prompts::CLEAN_TRANSCRIPT,
                    &chunk.text,
                    CleanedText::parse,
                )
                .await?;
            Ok::<_, TextServiceError>(TextChunk {
                text: cleaned.cleaned_text,
                ..chunk
            })
        }))
        .buffered(self.limits.cleaning_concurrency.max(1))
        .try_collect()
        .await?;

        Ok(merge_chunks(cleaned))
    }

    /// Cleans a speaker transcript and collects the speaker names the service identified.
    /// Chunks run one after another so the service sees them in conversation order.
    #[tracing::instrument(skip_all, fields(chars = transcript.len()))]
    pub async fn clean_speaker_transcript(
        &self,
        transcript: &str,
    ) -> Result<CleanedSpeakerTranscript, TextServiceError> {
        if self.is_short(transcript) {
            return Ok(CleanedSpeakerTranscript {
                cleaned_transcript: transcript.to_string(),
                speaker_mappings: SpeakerMappings::new(),
            });
        }

        let chunks = chunk_lines(transcript, self.limits.speaker_chunk_tokens);
        let last = chunks.len().saturating_sub(1);
        let mut parts = Vec::with_capacity(chunks.len());
        let mut speaker_mappings = SpeakerMappings::new();

        for (i, chunk) in chunks.iter().enumerate() {
            let cleaned = self
                .request(
                    TextTask::CleanSpeakerTranscript,
                    prompts::CLEAN_SPEAKER_TRANSCRIPT,
                    &chunk.text,
                    CleanedSpeakerTranscript::parse,
                )
                .await?;
            parts.push(cleaned.cleaned_transcript);
            speaker_mappings.extend(cleaned.speaker_mappings);

            if i < last {
                tokio::time::sleep(self.limits.speaker_chunk_delay).await;
            }
        }

        Ok(CleanedSpeakerTranscript {
            cleaned_transcript: merge_lines(parts.iter().map(String::as_str)),
            speaker_mappings,
        })
    }

    #[tracing::instrument(skip_all, fields(chars = text.len()))]
    pub async fn summarize(&self, text: &str) -> Result<String, TextServiceError> {
        if self.is_short(text) {
            tracing::debug!("Transcript too short to summarize, using it verbatim");
            return Ok(text.to_string());
        }

        if self.needs_batching(text) {
            return self.summarize_in_batches(text).await;
        }

        self.request(TextTask::Summarize, prompts::SUMMARIZE, text, parse_summary)
            .await
    }

    pub fn needs_batching(&self, text: &str) -> bool {
        let threshold = self.limits.summary_token_limit as f64 * self.limits.batch_threshold_ratio;
        count_tokens(text) as f64 > threshold
    }

    async fn summarize_in_batches(&self, text: &str) -> Result<String, TextServiceError> {
        let chunks = chunk_text(text, self.limits.summary_chunk_tokens);
        let last = chunks.len().saturating_sub(1);
        tracing::info!(batches = chunks.len(), "Summarizing transcript in batches");

        let mut summaries = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            let summary = self
                .request(
                    TextTask::Summarize,
                    prompts::SUMMARIZE,
                    &chunk.text,
                    parse_summary,
                )
                .await?;
            summaries.push(summary);

            if i < last {
                tokio::time::sleep(self.limits.summary_batch_delay).await;
            }
        }

        if summaries.len() == 1 {
            return Ok(summaries.remove(0));
        }

        let sections = summaries
            .iter()
            .enumerate()
            .map(|(i, s)| format!("Section {}:\n{}", i + 1, s))
            .collect::<Vec<_>>()
            .join("\n\n");

        match self
            .request(
                TextTask::CombineSummaries,
                prompts::COMBINE_SUMMARIES,
                &sections,
                parse_summary,
            )
            .await
        {
            Ok(combined) => Ok(combined),
            Err(e) => {
                tracing::warn!(error = %e, "Combining batch summaries failed, concatenating sections");
                Ok(sections)
            }
        }
    }

    async fn request<T>(
        &self,
        task: TextTask,
        prompt: &'static str,
        content: &str,
        parse: fn(&str) -> Result<T, TextServiceError>,
    ) -> Result<T, TextServiceError> {
        let service = self.text_service.as_ref();
        invoke_with_retry(&self.retry_policy, task.as_str(), move || async move {
            let raw = service
                .invoke(TextRequest {
                    task,
                    prompt,
                    content,
                })
                .await?;
            parse(&raw)
        })
        .await
    }

    fn is_short(&self, text: &str) -> bool {
        text.chars().count() < self.limits.min_text_chars
    }
}

fn parse_summary(raw: &str) -> Result<String, TextServiceError> {
    let summary = raw.trim();
    if summary.is_empty() {
        return Err(TextServiceError::MalformedResponse(
            "empty summary".to_string(),
        ));
    }
    Ok(summary.to_string())
}
