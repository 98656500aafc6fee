use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Runs of spaces or tabs, and spaces hugging a line break.
static INLINE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// NFC-normalizes recognizer output and collapses whitespace, keeping line structure. At
/// most one blank line survives between paragraphs.
pub fn normalize_transcript(raw: &str) -> String {
    let normalized: String = raw.replace("\r\n", "\n").nfc().collect();

    let lines: Vec<String> = normalized
        .lines()
        .map(|line| INLINE_WHITESPACE.replace_all(line.trim(), " ").into_owned())
        .collect();

    BLANK_LINES
        .replace_all(lines.join("\n").trim(), "\n\n")
        .into_owned()
}
