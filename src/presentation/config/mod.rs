mod environment;
mod scaffold_config;
mod settings;

pub use environment::Environment;
pub use scaffold_config::ScaffoldConfig;
pub use settings::{
    JobStoreProvider, JobStoreSettings, LlmProviderSetting, LlmSettings, LoggingSettings,
    PipelineSettings, RetrySettings, ServerSettings, Settings, StorageProviderSetting, StorageSettings,
    TranscriptionProviderSetting, TranscriptionSettings,
};
