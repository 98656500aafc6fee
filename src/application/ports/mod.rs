mod error_class;
mod job_repository;
mod metadata_provider;
mod repository_error;
mod staging_store;
mod text_service;
mod transcription_engine;

pub use error_class::{ErrorClass, Retryable};
pub use job_repository::JobRepository;
pub use metadata_provider::MetadataProvider;
pub use repository_error::RepositoryError;
pub use staging_store::{StagingStore, StagingStoreError};
pub use text_service::{
    CleanedSpeakerTranscript, CleanedText, TextRequest, TextService, TextServiceError, TextTask,
};
pub use transcription_engine::{
    TranscriptionEngine, TranscriptionError, TranscriptionOutput, TranscriptionRequest,
};
