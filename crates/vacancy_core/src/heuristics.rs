//! Text heuristics applied to listing markup once it is reduced to plain text.

use crate::Location;

/// Length of the title used when a detail block has no heading.
pub const TITLE_FALLBACK_CHARS: usize = 100;

/// Footer words that announce an expiry date; matched case-insensitively, whole token.
pub const EXPIRY_KEYWORDS: &[&str] = &["expires", "deadline", "closing"];

/// Collapses every run of whitespace into a single space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns at most `max` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Plain substring test against the known locations; first match wins.
pub fn infer_location(footer_text: &str) -> Option<Location> {
    Location::ALL
        .iter()
        .copied()
        .find(|location| footer_text.contains(location.name()))
}

/// Finds the first expiry keyword and returns the token that follows it.
///
/// Only the first keyword is considered: if it is the last token, the result is
/// `None` even when a later keyword would have been followed by a value. The
/// token is returned verbatim, punctuation included.
pub fn scan_expiry_token(footer_text: &str) -> Option<String> {
    let mut tokens = footer_text.split_whitespace();
    let keyword = tokens.by_ref().find(|token| {
        EXPIRY_KEYWORDS
            .iter()
            .any(|keyword| token.eq_ignore_ascii_case(keyword))
    });
    keyword.and(tokens.next()).map(ToOwned::to_owned)
}
