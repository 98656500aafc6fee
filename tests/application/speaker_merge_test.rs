use murmur::application::services::{
    UNKNOWN_SPEAKER, has_speaker_labels, merge_speaker_segments, render_speaker_transcript,
};
use murmur::domain::{SpeakerBlock, TranscriptSegment, WordEntry};

fn block(speaker: &str, text: &str) -> SpeakerBlock {
    SpeakerBlock {
        speaker: speaker.to_string(),
        text: text.to_string(),
    }
}

#[test]
fn given_consecutive_segments_from_one_speaker_when_merging_then_they_form_one_block() {
    let segments = vec![
        TranscriptSegment::with_speaker("Good morning.", "SPEAKER_00"),
        TranscriptSegment::with_speaker("Let's begin.", "SPEAKER_00"),
        TranscriptSegment::with_speaker("Thanks.", "SPEAKER_01"),
    ];

    let blocks = merge_speaker_segments(&segments);

    assert_eq!(
        blocks,
        vec![
            block("SPEAKER_00", "Good morning. Let's begin."),
            block("SPEAKER_01", "Thanks."),
        ]
    );
}

#[test]
fn given_word_labels_that_change_mid_segment_when_merging_then_blocks_follow_the_words() {
    let segments = vec![TranscriptSegment {
        text: "yes no".to_string(),
        speaker: Some("SPEAKER_00".to_string()),
        words: vec![
            WordEntry::new("yes", Some("SPEAKER_00")),
            WordEntry::new("no", Some("SPEAKER_01")),
        ],
    }];

    let blocks = merge_speaker_segments(&segments);

    assert_eq!(
        blocks,
        vec![block("SPEAKER_00", "yes"), block("SPEAKER_01", "no")]
    );
}

#[test]
fn given_unlabelled_word_when_merging_then_segment_speaker_is_used() {
    let segments = vec![TranscriptSegment {
        text: "well okay".to_string(),
        speaker: Some("SPEAKER_02".to_string()),
        words: vec![
            WordEntry::new("well", Some("SPEAKER_02")),
            WordEntry::new("okay", None),
        ],
    }];

    let blocks = merge_speaker_segments(&segments);

    assert_eq!(blocks, vec![block("SPEAKER_02", "well okay")]);
}

#[test]
fn given_unlabelled_word_in_unlabelled_segment_when_merging_then_previous_speaker_is_used() {
    let segments = vec![TranscriptSegment {
        text: "so anyway".to_string(),
        speaker: None,
        words: vec![
            WordEntry::new("so", Some("SPEAKER_01")),
            WordEntry::new("anyway", None),
        ],
    }];

    let blocks = merge_speaker_segments(&segments);

    assert_eq!(blocks, vec![block("SPEAKER_01", "so anyway")]);
}

#[test]
fn given_segment_without_any_label_when_merging_then_unknown_speaker_is_used() {
    let segments = vec![TranscriptSegment::new("background noise")];

    let blocks = merge_speaker_segments(&segments);

    assert_eq!(blocks, vec![block(UNKNOWN_SPEAKER, "background noise")]);
}

#[test]
fn given_blocks_when_rendering_then_one_line_per_speaker_turn() {
    let rendered = render_speaker_transcript(&[
        block("SPEAKER_00", "hi there"),
        block("SPEAKER_01", "ok"),
    ]);

    assert_eq!(rendered, "SPEAKER_00: hi there\nSPEAKER_01: ok");
}

#[test]
fn given_segments_with_and_without_labels_when_checking_then_labels_are_detected() {
    assert!(!has_speaker_labels(&[TranscriptSegment::new("plain")]));
    assert!(has_speaker_labels(&[TranscriptSegment::with_speaker(
        "labelled",
        "SPEAKER_00"
    )]));
    assert!(has_speaker_labels(&[TranscriptSegment {
        text: "word".to_string(),
        speaker: None,
        words: vec![WordEntry::new("word", Some("SPEAKER_03"))],
    }]));
}

#[test]
fn given_empty_segments_when_merging_then_no_blocks_are_produced() {
    let segments = vec![
        TranscriptSegment::with_speaker("   ", "SPEAKER_00"),
        TranscriptSegment::with_speaker("", "SPEAKER_01"),
    ];

    assert!(merge_speaker_segments(&segments).is_empty());
}
