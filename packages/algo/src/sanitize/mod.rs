//! Word Sanitization
//!
//! Normalization and capture validation for wordbook candidates.
//!
//! Functions:
//! - Word normalization (lowercase, strip non-letters)
//! - Stop-word exclusion
//! - Capture validation (length + stop-word gate)

use crate::types::MIN_WORD_LEN;

/// 停用词表：常见功能词不自动收录进单词本。
///
/// Kept sorted so membership checks can binary-search. Treated as
/// configuration data; the capture path is the only consumer.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "at", "be", "been", "being", "but", "by", "can", "could", "did", "do",
    "does", "false", "for", "had", "has", "have", "in", "is", "may", "might", "must", "null", "of",
    "on", "or", "should", "the", "to", "true", "undefined", "was", "were", "will", "with", "would",
];

/// 规范化单词：转小写并剥离所有非字母字符。
///
/// `"Cat!"` becomes `"cat"`, `"123"` becomes `""`.
pub fn normalize_word(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(char::is_ascii_lowercase)
        .collect()
}

/// Whether a normalized word sits on the stop-word exclusion list.
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.binary_search(&word).is_ok()
}

/// Validates a capture candidate and returns its normalized form.
///
/// Returns `None` when normalization yields fewer than [`MIN_WORD_LEN`]
/// letters or the word is a stop word. Callers treat `None` as a silent
/// no-op, never an error.
pub fn validate_candidate(raw: &str) -> Option<String> {
    let word = normalize_word(raw);
    if word.len() < MIN_WORD_LEN || is_stop_word(&word) {
        return None;
    }
    Some(word)
}
