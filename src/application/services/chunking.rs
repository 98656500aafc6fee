use std::sync::LazyLock;

use regex::Regex;

use super::token_counter::{count_tokens, split_by_tokens};
use crate::domain::TextChunk;

/// Terminal punctuation followed by whitespace, or a line break.
static SENTENCE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+|[ \t]*\n\s*").unwrap());

/// `LABEL: ` at the start of a rendered speaker line.
static SPEAKER_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_][A-Za-z0-9_ .'-]{0,63}):\s").unwrap());

/// Splits `text` into sentence-aligned chunks of at most `max_tokens` tokens.
///
/// A sentence that alone exceeds the budget is cut into token-bounded pieces, preferring
/// whitespace, and those pieces are flagged with `forced_split`. Each chunk keeps the original
/// separators between its sentences, so line structure inside a chunk survives. Labels such
/// as `SPEAKER_00: ` are not repeated on the pieces of a cut sentence; speaker transcripts go
/// through [`chunk_lines`].
pub fn chunk_text(text: &str, max_tokens: usize) -> Vec<TextChunk> {
    let mut packer = ChunkPacker::new(max_tokens);
    for unit in sentence_units(text) {
        packer.push(unit, split_sentence);
    }
    packer.finish()
}

/// Splits a line-oriented speaker transcript into chunks of whole lines.
///
/// Only a single turn above the budget is cut, on sentence boundaries first, and every piece
/// of it is prefixed with the turn's speaker label again.
pub fn chunk_lines(text: &str, max_tokens: usize) -> Vec<TextChunk> {
    let mut packer = ChunkPacker::new(max_tokens);
    for line in text.split_inclusive('\n').filter(|l| !l.trim().is_empty()) {
        packer.push(line, split_turn);
    }
    packer.finish()
}

/// The sentences of `text`, trimmed, in order.
pub fn split_sentences(text: &str) -> Vec<String> {
    sentence_units(text)
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Joins processed chunks in index order with a single space at each seam, unless either
/// side of the seam already carries whitespace.
pub fn merge_chunks(chunks: impl IntoIterator<Item = TextChunk>) -> String {
    let mut ordered: Vec<TextChunk> = chunks.into_iter().collect();
    ordered.sort_by_key(|c| c.index);
    join_parts(ordered.iter().map(|c| c.text.as_str()), " ")
}

/// Like [`merge_chunks`] but seams become line breaks. Used for line-oriented speaker
/// transcripts, where a space would glue two speaker turns onto one line.
pub fn merge_lines<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    join_parts(parts, "\n")
}

fn join_parts<'a>(parts: impl IntoIterator<Item = &'a str>, separator: &str) -> String {
    let mut merged = String::new();

    for part in parts.into_iter().filter(|p| !p.is_empty()) {
        if !merged.is_empty()
            && !merged.ends_with(char::is_whitespace)
            && !part.starts_with(char::is_whitespace)
        {
            merged.push_str(separator);
        }
        merged.push_str(part);
    }

    merged
}

/// Sentence slices including their trailing separator, so that concatenating them
/// reproduces `text` exactly.
fn sentence_units(text: &str) -> Vec<&str> {
    let mut units = Vec::new();
    let mut start = 0;

    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        units.push(&text[start..boundary.end()]);
        start = boundary.end();
    }
    if start < text.len() {
        units.push(&text[start..]);
    }

    units.retain(|u| !u.trim().is_empty());
    units
}

/// Accumulates units into chunks whose trimmed text stays within the token budget.
struct ChunkPacker<'a> {
    max_tokens: usize,
    chunks: Vec<TextChunk>,
    pending: Vec<&'a str>,
    /// Sum of the pending units' counts, separators included. An estimate; `emit_fitting`
    /// checks the exact count of the joined text.
    pending_tokens: usize,
}

impl<'a> ChunkPacker<'a> {
    fn new(max_tokens: usize) -> Self {
        Self {
            max_tokens: max_tokens.max(1),
            chunks: Vec::new(),
            pending: Vec::new(),
            pending_tokens: 0,
        }
    }

    fn push(&mut self, unit: &'a str, split: fn(&str, usize) -> Vec<TextChunk>) {
        if count_tokens(unit.trim()) > self.max_tokens {
            self.drain();
            for piece in split(unit.trim(), self.max_tokens) {
                self.emit(piece.text, piece.forced_split);
            }
            return;
        }

        let unit_tokens = count_tokens(unit);
        while !self.pending.is_empty() && self.pending_tokens + unit_tokens > self.max_tokens {
            self.emit_fitting();
        }
        self.pending.push(unit);
        self.pending_tokens += unit_tokens;
    }

    /// Emits the longest pending prefix whose trimmed text fits, always at least one unit.
    fn emit_fitting(&mut self) {
        let mut take = self.pending.len();
        while take > 1 && count_tokens(self.pending[..take].concat().trim()) > self.max_tokens {
            take -= 1;
        }

        let text = self.pending[..take].concat();
        self.emit(text.trim().to_string(), false);
        self.pending.drain(..take);
        self.pending_tokens = self.pending.iter().map(|u| count_tokens(u)).sum();
    }

    fn drain(&mut self) {
        while !self.pending.is_empty() {
            self.emit_fitting();
        }
    }

    fn emit(&mut self, text: String, forced_split: bool) {
        if text.is_empty() {
            return;
        }
        let index = self.chunks.len();
        self.chunks.push(if forced_split {
            TextChunk::forced(index, text)
        } else {
            TextChunk::new(index, text)
        });
    }

    fn finish(mut self) -> Vec<TextChunk> {
        self.drain();
        self.chunks
    }
}

fn split_sentence(sentence: &str, max_tokens: usize) -> Vec<TextChunk> {
    split_by_tokens(sentence, max_tokens)
        .into_iter()
        .enumerate()
        .map(|(i, piece)| TextChunk::forced(i, piece))
        .collect()
}

fn split_turn(line: &str, max_tokens: usize) -> Vec<TextChunk> {
    let Some(label) = SPEAKER_LABEL.captures(line).and_then(|c| c.get(1)) else {
        return chunk_text(line, max_tokens);
    };

    let prefix = format!("{}: ", label.as_str());
    let body = line[label.end()..].trim_start_matches(':').trim();
    let budget = max_tokens.saturating_sub(count_tokens(&prefix)).max(1);

    chunk_text(body, budget)
        .into_iter()
        .map(|chunk| TextChunk {
            text: format!("{}{}", prefix, chunk.text),
            ..chunk
        })
        .collect()
}
