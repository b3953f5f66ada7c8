//! Message normalization applied before any rule is consulted.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Characters stripped from the end of a message.
const TRAILING_PUNCTUATION: &[char] = &[',', ';', '.', '!', '?'];

/// Normalize a raw chat message for matching.
///
/// Steps applied in order:
/// 1. Lowercase.
/// 2. Fold diacritics (`á` → `a`, `ü` → `u`). `ñ` is kept as-is.
/// 3. Drop every `¿` and `¡`.
/// 4. Collapse whitespace runs to a single space and trim.
/// 5. Strip a trailing run of `, ; . ! ?` and trim again.
///
/// # Panics
/// This function never panics.
pub fn normalize(message: &str) -> String {
    let lowered = message.to_lowercase();

    let mut folded = String::with_capacity(lowered.len());
    for ch in lowered.chars() {
        match ch {
            '¿' | '¡' => {}
            'ñ' => folded.push(ch),
            _ => folded.extend(std::iter::once(ch).nfd().filter(|c| !is_combining_mark(*c))),
        }
    }

    let collapsed = folded.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches(TRAILING_PUNCTUATION)
        .trim_end()
        .to_string()
}
