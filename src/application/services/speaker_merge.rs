use crate::domain::{SpeakerBlock, TranscriptSegment};

pub const UNKNOWN_SPEAKER: &str = "UNKNOWN";

/// Groups diarized output into per-speaker blocks.
///
/// Word-level labels are used when a segment has any; a word without its own label takes
/// the segment's label, then the previous speaker's. Segments without labelled words
/// contribute their whole text under the segment label. Consecutive entries with the same
/// label, including across segment boundaries, end up in one block. Input order is kept.
pub fn merge_speaker_segments(segments: &[TranscriptSegment]) -> Vec<SpeakerBlock> {
    let mut grouper = BlockGrouper::default();

    for segment in segments {
        let has_word_labels = segment.words.iter().any(|w| w.speaker.is_some());

        if has_word_labels {
            for word in &segment.words {
                let speaker = word
                    .speaker
                    .clone()
                    .or_else(|| segment.speaker.clone())
                    .or_else(|| grouper.current_speaker().map(str::to_string))
                    .unwrap_or_else(|| UNKNOWN_SPEAKER.to_string());
                grouper.push(speaker, &word.word);
            }
        } else {
            let speaker = segment
                .speaker
                .clone()
                .unwrap_or_else(|| UNKNOWN_SPEAKER.to_string());
            grouper.push(speaker, &segment.text);
        }
    }

    grouper.finish()
}

/// `"{speaker}: {text}"` per block, one block per line.
pub fn render_speaker_transcript(blocks: &[SpeakerBlock]) -> String {
    blocks
        .iter()
        .map(SpeakerBlock::render)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn has_speaker_labels(segments: &[TranscriptSegment]) -> bool {
    segments
        .iter()
        .any(|s| s.speaker.is_some() || s.words.iter().any(|w| w.speaker.is_some()))
}

#[derive(Default)]
struct BlockGrouper {
    blocks: Vec<SpeakerBlock>,
    speaker: Option<String>,
    parts: Vec<String>,
}

impl BlockGrouper {
    fn current_speaker(&self) -> Option<&str> {
        self.speaker.as_deref()
    }

    fn push(&mut self, speaker: String, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        if self.speaker.as_deref() != Some(speaker.as_str()) {
            self.flush();
            self.speaker = Some(speaker);
        }
        self.parts.push(text.to_string());
    }

    fn flush(&mut self) {
        if let Some(speaker) = self.speaker.take() {
            if !self.parts.is_empty() {
                self.blocks.push(SpeakerBlock {
                    speaker,
                    text: self.parts.join(" "),
                });
            }
        }
        self.parts.clear();
    }

    fn finish(mut self) -> Vec<SpeakerBlock> {
        self.flush();
        self.blocks
    }
}
