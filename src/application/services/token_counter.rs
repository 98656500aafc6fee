use std::sync::LazyLock;
use tiktoken_rs::CoreBPE;

/// Rough characters-per-token ratio used when the BPE tables are unavailable.
pub const CHARS_PER_TOKEN: usize = 3;

static TOKENIZER: LazyLock<Option<CoreBPE>> = LazyLock::new(|| match tiktoken_rs::cl100k_base() {
    Ok(bpe) => Some(bpe),
    Err(e) => {
        tracing::warn!(error = %e, "cl100k_base tokenizer unavailable, estimating from characters");
        None
    }
});

pub fn count_tokens(text: &str) -> usize {
    match TOKENIZER.as_ref() {
        Some(bpe) => bpe.encode_with_special_tokens(text).len(),
        None => text.chars().count().div_ceil(CHARS_PER_TOKEN),
    }
}

/// Cuts `text` into consecutive pieces of at most `max_tokens` tokens.
///
/// The text is encoded once and the token sequence is walked window by window. A cut moves
/// back to the last whitespace-led token in the second half of the window so words stay
/// whole where possible. Pieces are trimmed; empty pieces are dropped.
pub fn split_by_tokens(text: &str, max_tokens: usize) -> Vec<String> {
    let max_tokens = max_tokens.max(1);
    match TOKENIZER.as_ref() {
        Some(bpe) => split_encoded(bpe, text, max_tokens),
        None => split_chars(text, max_tokens * CHARS_PER_TOKEN),
    }
}

fn split_encoded(bpe: &CoreBPE, text: &str, max_tokens: usize) -> Vec<String> {
    // Slack for windows that end inside a multi-byte character.
    const MAX_NUDGE: usize = 3;

    let tokens = bpe.encode_with_special_tokens(text);
    let starts_with_whitespace = |i: usize| {
        bpe.decode(vec![tokens[i]])
            .is_ok_and(|t| t.starts_with(char::is_whitespace))
    };
    let mut pieces = Vec::new();
    let mut start = 0;

    while start < tokens.len() {
        let mut end = (start + max_tokens).min(tokens.len());
        if end < tokens.len() {
            let floor = start + max_tokens / 2 + 1;
            if let Some(cut) = (floor..end).rev().find(|&i| starts_with_whitespace(i)) {
                end = cut;
            }
        }

        let shorter = (0..=MAX_NUDGE).map(|n| end.saturating_sub(n)).filter(|&e| e > start);
        let longer = (1..=MAX_NUDGE).map(|n| end + n).filter(|&e| e <= tokens.len());
        let window = shorter.chain(longer).find_map(|candidate| {
            bpe.decode(tokens[start..candidate].to_vec())
                .ok()
                .map(|piece| (piece, candidate))
        });
        // Earlier windows all ended on character boundaries, so the rest decodes on its own.
        let (piece, next) = window.unwrap_or_else(|| {
            let rest = bpe.decode(tokens[start..].to_vec()).unwrap_or_default();
            (rest, tokens.len())
        });

        let piece = piece.trim();
        if !piece.is_empty() {
            pieces.push(piece.to_string());
        }
        start = next;
    }

    pieces
}

fn split_chars(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut pieces = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = (start + max_chars).min(chars.len());
        if end < chars.len() {
            let floor = start + max_chars / 2 + 1;
            if let Some(cut) = (floor..end).rev().find(|&i| chars[i].is_whitespace()) {
                end = cut;
            }
        }

        let piece: String = chars[start..end].iter().collect();
        let piece = piece.trim();
        if !piece.is_empty() {
            pieces.push(piece.to_string());
        }
        start = end;
    }

    pieces
}
