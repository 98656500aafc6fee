use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{StagingStore, TranscriptionEngine, TranscriptionError};
use crate::presentation::config::{TranscriptionProviderSetting, TranscriptionSettings};

use super::openai_whisper_engine::OpenAiWhisperEngine;
use super::remote_diarization_engine::RemoteDiarizationEngine;

pub struct TranscriptionEngineFactory;

impl TranscriptionEngineFactory {
    pub fn create(
        settings: &TranscriptionSettings,
        staging_store: Arc<dyn StagingStore>,
        request_timeout: Duration,
    ) -> Result<Arc<dyn TranscriptionEngine>, TranscriptionError> {
        match settings.provider {
            TranscriptionProviderSetting::Remote => {
                let engine = RemoteDiarizationEngine::new(
                    &settings.base_url,
                    settings.api_key.clone(),
                    request_timeout,
                )?;
                Ok(Arc::new(engine))
            }
            TranscriptionProviderSetting::OpenAi => {
                let key = settings
                    .api_key
                    .clone()
                    .filter(|k| !k.is_empty())
                    .ok_or_else(|| {
                        TranscriptionError::Rejected(
                            "API key required for OpenAI Whisper".to_string(),
                        )
                    })?;
                let engine = OpenAiWhisperEngine::new(
                    staging_store,
                    key,
                    Some(settings.base_url.clone()),
                    Some(settings.model.clone()),
                    request_timeout,
                )?;
                Ok(Arc::new(engine))
            }
        }
    }
}
