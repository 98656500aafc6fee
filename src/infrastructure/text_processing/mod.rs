mod transcript_normalizer;

pub use transcript_normalizer::normalize_transcript;
