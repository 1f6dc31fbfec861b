//! Grapheme-indexed helpers over `String`.
//!
//! Every offset the engine deals with (cursor positions, insertion points,
//! length limits) counts user-perceived characters, i.e. extended grapheme
//! clusters. These helpers translate those offsets into byte positions.

use unicode_segmentation::UnicodeSegmentation;

/// Number of grapheme clusters in `text`.
pub fn len(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Byte offset of grapheme index `idx`, clamped to the end of `text`.
pub fn byte_offset(text: &str, idx: usize) -> usize {
    text.grapheme_indices(true)
        .nth(idx)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

/// The first `count` graphemes of `text`.
pub fn prefix(text: &str, count: usize) -> &str {
    &text[..byte_offset(text, count)]
}

/// Graphemes `[start, end)` of `text`. Bounds are clamped.
pub fn slice(text: &str, start: usize, end: usize) -> &str {
    let start_byte = byte_offset(text, start);
    let end_byte = byte_offset(text, end.max(start));
    &text[start_byte..end_byte]
}

/// Split `text` into owned grapheme clusters.
pub fn split(text: &str) -> impl Iterator<Item = String> + '_ {
    text.graphemes(true).map(str::to_owned)
}

/// Insert `piece` before grapheme index `idx` (clamped to the end).
pub fn insert(text: &mut String, idx: usize, piece: &str) {
    let byte = byte_offset(text, idx);
    text.insert_str(byte, piece);
}

/// Remove graphemes `[start, end)` from `text`, returning the result.
pub fn remove_range(text: &str, start: usize, end: usize) -> String {
    let start_byte = byte_offset(text, start);
    let end_byte = byte_offset(text, end.max(start));
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..start_byte]);
    out.push_str(&text[end_byte..]);
    out
}
