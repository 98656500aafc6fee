mod chunk;
mod job;
mod job_id;
mod job_status;
mod speaker_settings;
mod storage_path;
mod transcript;

pub use chunk::TextChunk;
pub use job::{AudioMetadata, JobData, JobRecord, SpeakerMappings};
pub use job_id::{InvalidJobId, JobId};
pub use job_status::JobStatus;
pub use speaker_settings::{DEFAULT_NUM_SPEAKERS, MAX_SPEAKERS, MIN_SPEAKERS, SpeakerSettings};
pub use storage_path::StoragePath;
pub use transcript::{SpeakerBlock, TranscriptSegment, WordEntry};
