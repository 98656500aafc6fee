use serde::{Deserialize, Serialize};

/// One segment as returned by the transcription service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(default)]
    pub words: Vec<WordEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    #[serde(alias = "text")]
    pub word: String,
    #[serde(default)]
    pub speaker: Option<String>,
}

/// Consecutive speech attributed to one speaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerBlock {
    pub speaker: String,
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speaker: None,
            words: Vec::new(),
        }
    }

    pub fn with_speaker(text: impl Into<String>, speaker: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speaker: Some(speaker.into()),
            words: Vec::new(),
        }
    }
}

impl WordEntry {
    pub fn new(word: impl Into<String>, speaker: Option<&str>) -> Self {
        Self {
            word: word.into(),
            speaker: speaker.map(str::to_string),
        }
    }
}

impl SpeakerBlock {
    pub fn render(&self) -> String {
        format!("{}: {}", self.speaker, self.text)
    }
}
