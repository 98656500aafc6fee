use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::application::ports::{TextRequest, TextService, TextServiceError, TextTask};

/// Echoes content back in the shape each task expects. Used in scaffold mode.
pub struct MockTextService {
    delay: Duration,
}

impl MockTextService {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl TextService for MockTextService {
    async fn invoke(&self, request: TextRequest<'_>) -> Result<String, TextServiceError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let answer = match request.task {
            TextTask::CleanTranscript => json!({ "cleaned_text": request.content }).to_string(),
            TextTask::CleanSpeakerTranscript => json!({
                "cleaned_transcript": request.content,
                "speaker_ids": [],
                "speaker_names": [],
            })
            .to_string(),
            TextTask::Summarize | TextTask::CombineSummaries => {
                let words = request.content.split_whitespace().count();
                format!("<p>Mock summary of {} words.</p>", words)
            }
        };
        Ok(answer)
    }
}
