pub const CLEAN_TRANSCRIPT: &str = r#"You are editing an automatic speech recognition transcript.
Fix capitalization, punctuation and spacing. Remove filler words, false starts and accidental
repetitions. Correct obvious recognition errors and homophones from context. Split the text
into paragraphs. Wrap sponsor reads and advertisements in [AD]...[/AD] on their own paragraph.
Do not summarize and do not drop content.

Answer with a JSON object: {"cleaned_text": ["paragraph", ...]}"#;

pub const CLEAN_SPEAKER_TRANSCRIPT: &str = r#"You are editing a diarized transcript where every line looks like "SPEAKER_00: text".
Keep one speaker turn per line and keep the original speaker labels. Fix capitalization,
punctuation and spacing, remove filler words and merge broken turns from the same speaker.
Wrap advertisements in [AD]...[/AD]. Identify speakers' full names from introductions or from
how they are addressed, and report them as parallel arrays. Leave both arrays empty when no
name can be identified.

Answer with a JSON object:
{"cleaned_transcript": ["SPEAKER_00: ...", ...], "speaker_ids": ["SPEAKER_00"], "speaker_names": ["Jane Doe"]}"#;

pub const SUMMARIZE: &str = r#"Write a detailed summary of the following transcript.
Start with a short overview, then cover the main topics in the order they are discussed with
the key points, claims and conclusions of each. Skip advertisements. Use HTML tags only
(<h3>, <p>, <strong>, <ul>, <li>), no markdown."#;

pub const COMBINE_SUMMARIES: &str = r#"The following are summaries of consecutive sections of one long transcript.
Merge them into a single summary of the whole transcript. Remove repetition between sections,
keep the chronological order of topics and unify terminology. Use HTML tags only
(<h3>, <p>, <strong>, <ul>, <li>), no markdown."#;
