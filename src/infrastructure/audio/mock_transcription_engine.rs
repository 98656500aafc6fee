use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{
    TranscriptionEngine, TranscriptionError, TranscriptionOutput, TranscriptionRequest,
};
use crate::domain::{TranscriptSegment, WordEntry};

const SCRIPT: [&str; 4] = [
    "Welcome back to the show.",
    "Thanks for having me, it is great to be here.",
    "Let us start with what you have been working on.",
    "Mostly on making long recordings searchable.",
];

/// Canned two-speaker conversation. Used in scaffold mode.
pub struct MockTranscriptionEngine {
    delay: Duration,
}

impl MockTranscriptionEngine {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl TranscriptionEngine for MockTranscriptionEngine {
    async fn transcribe(
        &self,
        request: &TranscriptionRequest,
    ) -> Result<TranscriptionOutput, TranscriptionError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let speakers = request.num_speakers.max(1);
        let segments = SCRIPT
            .iter()
            .enumerate()
            .map(|(i, line)| {
                if !request.enable_speakers {
                    return TranscriptSegment::new(*line);
                }
                let label = format!("SPEAKER_{:02}", i % usize::from(speakers));
                TranscriptSegment {
                    text: line.to_string(),
                    speaker: Some(label.clone()),
                    words: line
                        .split_whitespace()
                        .map(|w| WordEntry::new(w, Some(&label)))
                        .collect(),
                }
            })
            .collect();

        Ok(TranscriptionOutput {
            segments,
            text: None,
            language: Some("en".to_string()),
            elapsed: self.delay,
        })
    }
}
