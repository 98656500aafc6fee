mod mock_transcription_engine;
mod openai_whisper_engine;
mod remote_diarization_engine;
mod response_status;
mod transcription_engine_factory;

pub use mock_transcription_engine::MockTranscriptionEngine;
pub use openai_whisper_engine::OpenAiWhisperEngine;
pub use remote_diarization_engine::RemoteDiarizationEngine;
pub use transcription_engine_factory::TranscriptionEngineFactory;
