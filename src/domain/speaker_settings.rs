use serde::{Deserialize, Serialize};

pub const MIN_SPEAKERS: u8 = 1;
pub const MAX_SPEAKERS: u8 = 10;
pub const DEFAULT_NUM_SPEAKERS: u8 = 2;

/// Diarization options chosen at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerSettings {
    pub enable_speakers: bool,
    pub num_speakers: u8,
}

impl SpeakerSettings {
    pub fn new(enable_speakers: bool, num_speakers: u8) -> Self {
        Self {
            enable_speakers,
            num_speakers,
        }
    }

    /// Builds settings from untrusted input. Out-of-range counts fall back to the default
    /// rather than being rejected.
    pub fn from_request(enable_speakers: Option<bool>, num_speakers: Option<i64>) -> Self {
        let num_speakers = num_speakers
            .filter(|n| (i64::from(MIN_SPEAKERS)..=i64::from(MAX_SPEAKERS)).contains(n))
            .map(|n| n as u8)
            .unwrap_or(DEFAULT_NUM_SPEAKERS);

        Self {
            enable_speakers: enable_speakers.unwrap_or(true),
            num_speakers,
        }
    }

    pub fn disabled() -> Self {
        Self::new(false, 1)
    }
}

impl Default for SpeakerSettings {
    fn default() -> Self {
        Self::new(true, DEFAULT_NUM_SPEAKERS)
    }
}
