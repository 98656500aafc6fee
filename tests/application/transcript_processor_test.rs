use std::sync::Arc;
use std::time::Duration;

use murmur::application::ports::TextTask;
use murmur::application::services::{ProcessingLimits, TranscriptProcessor};

use crate::helpers::{FakeTextService, fast_retry, test_limits};

fn processor(text_service: Arc<FakeTextService>, limits: ProcessingLimits) -> TranscriptProcessor {
    TranscriptProcessor::new(text_service, fast_retry(), limits)
}

fn numbered_sentences(count: usize) -> String {
    (0..count)
        .map(|i| format!("speaker said thing number {}.", i))
        .collect::<Vec<_>>()
        .join(" ")
}

#[tokio::test]
async fn given_text_below_minimum_when_processing_then_service_is_not_called() {
    let service = Arc::new(FakeTextService::new());
    let processor = processor(service.clone(), ProcessingLimits::default());

    let cleaned = processor.clean_transcript("too short").await.unwrap();
    let summary = processor.summarize("too short").await.unwrap();
    let speakers = processor
        .clean_speaker_transcript("SPEAKER_00: hi")
        .await
        .unwrap();

    assert_eq!(cleaned, "too short");
    assert_eq!(summary, "too short");
    assert_eq!(speakers.cleaned_transcript, "SPEAKER_00: hi");
    assert!(speakers.speaker_mappings.is_empty());
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn given_multi_chunk_transcript_when_cleaning_then_chunks_are_reassembled_in_order() {
    let service = Arc::new(FakeTextService::new());
    let limits = ProcessingLimits {
        cleaning_chunk_tokens: 20,
        cleaning_concurrency: 4,
        ..test_limits()
    };
    let processor = processor(service.clone(), limits);
    let text = numbered_sentences(30);

    let cleaned = processor.clean_transcript(&text).await.unwrap();

    let chunks = service.calls_for(TextTask::CleanTranscript);
    assert!(chunks > 1);
    let positions: Vec<usize> = (0..30)
        .map(|i| {
            cleaned
                .find(&format!("number {}.", i))
                .unwrap_or_else(|| panic!("sentence {} missing", i))
        })
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(cleaned.starts_with("Speaker said thing number 0."));
}

/// Earlier sentences wait longer, so concurrent chunks answer back to front.
fn earlier_chunks_answer_later(content: &str) -> Duration {
    let first = content
        .split_whitespace()
        .find_map(|word| word.trim_end_matches('.').parse::<u64>().ok())
        .unwrap_or(0);
    Duration::from_millis(100 - first.min(99))
}

#[tokio::test(start_paused = true)]
async fn given_chunks_finishing_out_of_order_when_cleaning_then_merge_follows_original_order() {
    let service = Arc::new(FakeTextService::new().with_clean_delay(earlier_chunks_answer_later));
    let limits = ProcessingLimits {
        cleaning_chunk_tokens: 20,
        cleaning_concurrency: 8,
        ..test_limits()
    };
    let processor = processor(service.clone(), limits);
    let text = numbered_sentences(30);

    let cleaned = processor.clean_transcript(&text).await.unwrap();

    let requested: Vec<String> = service
        .calls()
        .into_iter()
        .filter(|(task, _)| *task == TextTask::CleanTranscript)
        .map(|(_, content)| content)
        .collect();
    let finished = service.finished_cleanings();
    assert!(requested.len() > 2);
    assert_ne!(finished, requested, "answers arrived in request order");
    assert_ne!(finished.first(), requested.first());

    let positions: Vec<usize> = (0..30)
        .map(|i| cleaned.find(&format!("number {}.", i)).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(cleaned.starts_with("Speaker said thing number 0."));
}

#[tokio::test]
async fn given_turn_longer_than_budget_when_cleaning_speakers_then_every_line_keeps_a_label() {
    let service = Arc::new(FakeTextService::new());
    let limits = ProcessingLimits {
        speaker_chunk_tokens: 40,
        ..test_limits()
    };
    let processor = processor(service.clone(), limits);
    let long_answer = (1..=12)
        .map(|i| format!("This is sentence number {} of a long answer.", i))
        .collect::<Vec<_>>()
        .join(" ");
    let transcript = format!(
        "SPEAKER_01: Tell me more.\nSPEAKER_00: {}\nSPEAKER_01: Thanks.",
        long_answer
    );

    let cleaned = processor
        .clean_speaker_transcript(&transcript)
        .await
        .unwrap();

    assert!(service.calls_for(TextTask::CleanSpeakerTranscript) > 2);
    let lines: Vec<&str> = cleaned.cleaned_transcript.lines().collect();
    assert!(lines.len() > 3);
    for line in &lines {
        assert!(
            line.starts_with("SPEAKER_00: ") || line.starts_with("SPEAKER_01: "),
            "unlabelled line: {}",
            line
        );
    }
    assert_eq!(lines.first(), Some(&"SPEAKER_01: Tell me more."));
    assert_eq!(lines.last(), Some(&"SPEAKER_01: Thanks."));
    for i in 1..=12 {
        assert!(cleaned
            .cleaned_transcript
            .contains(&format!("sentence number {} of", i)));
    }
}

#[tokio::test]
async fn given_long_speaker_transcript_when_cleaning_then_parts_are_joined_by_line_and_names_collected() {
    let service = Arc::new(FakeTextService::naming(&[("SPEAKER_00", "Host")]));
    let limits = ProcessingLimits {
        speaker_chunk_tokens: 15,
        ..test_limits()
    };
    let processor = processor(service.clone(), limits);
    let transcript = (0..10)
        .map(|i| format!("SPEAKER_0{}: line {}", i % 2, i))
        .collect::<Vec<_>>()
        .join("\n");

    let cleaned = processor
        .clean_speaker_transcript(&transcript)
        .await
        .unwrap();

    assert!(service.calls_for(TextTask::CleanSpeakerTranscript) > 1);
    assert_eq!(cleaned.cleaned_transcript, transcript);
    assert_eq!(cleaned.speaker_mappings["SPEAKER_00"], "Host");
}

#[tokio::test]
async fn given_text_under_batch_threshold_when_summarizing_then_one_request_is_made() {
    let service = Arc::new(FakeTextService::new());
    let processor = processor(service.clone(), test_limits());

    let summary = processor
        .summarize("one two three four five")
        .await
        .unwrap();

    assert_eq!(summary, "<p>Summary of 5 words.</p>");
    assert_eq!(service.calls_for(TextTask::Summarize), 1);
    assert_eq!(service.calls_for(TextTask::CombineSummaries), 0);
}

#[tokio::test]
async fn given_text_over_batch_threshold_when_summarizing_then_batches_are_combined() {
    let service = Arc::new(FakeTextService::new());
    let limits = ProcessingLimits {
        summary_token_limit: 50,
        batch_threshold_ratio: 0.8,
        summary_chunk_tokens: 30,
        ..test_limits()
    };
    let processor = processor(service.clone(), limits);
    let text = numbered_sentences(20);
    assert!(processor.needs_batching(&text));

    let summary = processor.summarize(&text).await.unwrap();

    let batches = service.calls_for(TextTask::Summarize);
    assert!(batches > 1);
    assert_eq!(service.calls_for(TextTask::CombineSummaries), 1);
    let combine_input = service
        .calls()
        .into_iter()
        .find(|(task, _)| *task == TextTask::CombineSummaries)
        .map(|(_, content)| content)
        .unwrap();
    assert!(combine_input.starts_with("Section 1:\n"));
    assert!(combine_input.contains(&format!("Section {}:\n", batches)));
    assert!(summary.starts_with("<p>Summary of"));
}

#[tokio::test]
async fn given_failing_summaries_when_summarizing_then_error_is_returned() {
    let service = Arc::new(FakeTextService::failing_summaries());
    let processor = processor(service.clone(), test_limits());

    let result = processor.summarize("a transcript worth summarizing").await;

    assert!(result.is_err());
    assert_eq!(service.calls_for(TextTask::Summarize), 1);
}

#[tokio::test]
async fn given_combine_failure_when_summarizing_in_batches_then_sections_are_concatenated() {
    let service = Arc::new(FakeTextService::failing_combine());
    let limits = ProcessingLimits {
        summary_token_limit: 50,
        batch_threshold_ratio: 0.8,
        summary_chunk_tokens: 30,
        ..test_limits()
    };
    let processor = processor(service.clone(), limits);

    let summary = processor.summarize(&numbered_sentences(20)).await.unwrap();

    let batches = service.calls_for(TextTask::Summarize);
    let sections: Vec<&str> = summary.split("\n\n").collect();
    assert_eq!(sections.len(), batches);
    assert!(sections[0].starts_with("Section 1:\n<p>Summary of"));
    assert_eq!(service.calls_for(TextTask::CombineSummaries), 1);
}
