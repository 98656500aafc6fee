mod active_jobs;
mod chunking;
mod job_pipeline;
mod job_service;
mod pipeline_worker;
pub mod prompts;
mod retry;
mod speaker_merge;
mod token_counter;
mod transcript_processor;

pub use active_jobs::{ActiveJobGuard, ActiveJobs};
pub use chunking::{chunk_lines, chunk_text, merge_chunks, merge_lines, split_sentences};
pub use job_pipeline::{JobPipeline, PipelineError};
pub use job_service::{JobService, JobServiceError, SubmitOutcome, UploadOutcome};
pub use pipeline_worker::{JobMessage, PipelineWorker};
pub use retry::{RetryPolicy, invoke_with_retry};
pub use speaker_merge::{
    UNKNOWN_SPEAKER, has_speaker_labels, merge_speaker_segments, render_speaker_transcript,
};
pub use token_counter::{CHARS_PER_TOKEN, count_tokens, split_by_tokens};
pub use transcript_processor::{ProcessingLimits, TranscriptProcessor};
