use std::time::Duration;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use super::Environment;
use crate::application::services::{ProcessingLimits, RetryPolicy};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub jobs: JobStoreSettings,
    #[serde(default)]
    pub transcription: TranscriptionSettings,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Layers `appsettings.{environment}.toml` (optional) under `APP__SECTION__KEY`
    /// environment variables.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
    /// Capacity of the pipeline worker queue.
    pub queue_capacity: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_upload_mb: 500,
            queue_capacity: 128,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderSetting {
    #[default]
    Local,
    Azure,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub provider: StorageProviderSetting,
    pub local_path: String,
    pub azure_account: Option<String>,
    pub azure_access_key: Option<String>,
    pub azure_container: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: StorageProviderSetting::Local,
            local_path: "data/staging".to_string(),
            azure_account: None,
            azure_access_key: None,
            azure_container: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStoreProvider {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JobStoreSettings {
    pub provider: JobStoreProvider,
    pub path: String,
}

impl Default for JobStoreSettings {
    fn default() -> Self {
        Self {
            provider: JobStoreProvider::File,
            path: "data/jobs".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionProviderSetting {
    /// GPU transcription service with diarization.
    #[default]
    Remote,
    #[serde(rename = "openai")]
    OpenAi,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    pub provider: TranscriptionProviderSetting,
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            provider: TranscriptionProviderSetting::Remote,
            base_url: "http://localhost:8000".to_string(),
            api_key: None,
            model: "whisper-1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderSetting {
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    /// Azure OpenAI; authenticates with an `api-key` header.
    Azure,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: LlmProviderSetting,
    pub base_url: String,
    pub api_key: String,
    pub cleaning_model: String,
    pub summary_model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProviderSetting::OpenAi,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            cleaning_model: "gpt-4o-mini".to_string(),
            summary_model: "gpt-4o".to_string(),
            temperature: 0.2,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub cleaning_chunk_tokens: usize,
    pub cleaning_concurrency: usize,
    pub speaker_chunk_tokens: usize,
    pub summary_token_limit: usize,
    pub batch_threshold_ratio: f64,
    pub summary_chunk_tokens: usize,
    pub min_text_chars: usize,
    pub speaker_chunk_delay_ms: u64,
    pub summary_batch_delay_ms: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        let limits = ProcessingLimits::default();
        Self {
            cleaning_chunk_tokens: limits.cleaning_chunk_tokens,
            cleaning_concurrency: limits.cleaning_concurrency,
            speaker_chunk_tokens: limits.speaker_chunk_tokens,
            summary_token_limit: limits.summary_token_limit,
            batch_threshold_ratio: limits.batch_threshold_ratio,
            summary_chunk_tokens: limits.summary_chunk_tokens,
            min_text_chars: limits.min_text_chars,
            speaker_chunk_delay_ms: limits.speaker_chunk_delay.as_millis() as u64,
            summary_batch_delay_ms: limits.summary_batch_delay.as_millis() as u64,
        }
    }
}

impl PipelineSettings {
    pub fn limits(&self) -> ProcessingLimits {
        ProcessingLimits {
            cleaning_chunk_tokens: self.cleaning_chunk_tokens,
            cleaning_concurrency: self.cleaning_concurrency,
            speaker_chunk_tokens: self.speaker_chunk_tokens,
            summary_token_limit: self.summary_token_limit,
            batch_threshold_ratio: self.batch_threshold_ratio,
            summary_chunk_tokens: self.summary_chunk_tokens,
            min_text_chars: self.min_text_chars,
            speaker_chunk_delay: Duration::from_millis(self.speaker_chunk_delay_ms),
            summary_batch_delay: Duration::from_millis(self.summary_batch_delay_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub rate_limit_delay_secs: u64,
    pub timeout_delay_secs: u64,
    pub initial_delay_secs: u64,
    pub backoff_multiplier: u32,
    pub max_backoff_secs: u64,
    pub text_call_timeout_secs: Option<u64>,
    pub transcription_call_timeout_secs: Option<u64>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 4,
            rate_limit_delay_secs: 60,
            timeout_delay_secs: 120,
            initial_delay_secs: 5,
            backoff_multiplier: 2,
            max_backoff_secs: 300,
            text_call_timeout_secs: Some(600),
            transcription_call_timeout_secs: Some(3600),
        }
    }
}

impl RetrySettings {
    pub fn text_policy(&self) -> RetryPolicy {
        self.policy(self.text_call_timeout_secs)
    }

    pub fn transcription_policy(&self) -> RetryPolicy {
        self.policy(self.transcription_call_timeout_secs)
    }

    fn policy(&self, call_timeout_secs: Option<u64>) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            rate_limit_delay: Duration::from_secs(self.rate_limit_delay_secs),
            timeout_delay: Duration::from_secs(self.timeout_delay_secs),
            initial_delay: Duration::from_secs(self.initial_delay_secs),
            backoff_multiplier: self.backoff_multiplier,
            max_backoff: Duration::from_secs(self.max_backoff_secs),
            call_timeout: call_timeout_secs.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info,murmur=debug,tower_http=debug".to_string(),
            enable_json: false,
        }
    }
}
