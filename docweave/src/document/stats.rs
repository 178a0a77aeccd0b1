//! Word count and reading time
//!
//! Word count is the number of whitespace-delimited tokens in the body,
//! including fenced code content. Reading time derives from the word count
//! and is kept consistent with that policy.

/// Reading speed used to estimate reading time
pub const WORDS_PER_MINUTE: usize = 200;

/// Count whitespace-delimited tokens in the body
pub fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

/// Estimated reading time in whole minutes
///
/// Zero for an empty document, otherwise at least one minute.
pub fn reading_time(words: usize) -> usize {
    if words == 0 {
        0
    } else {
        words.div_ceil(WORDS_PER_MINUTE)
    }
}
