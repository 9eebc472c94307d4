//! Word-level metrics over extracted text.

/// Default size of the leading text window.
pub const DEFAULT_WINDOW_WORDS: usize = 500;

/// Number of whitespace-delimited tokens in `text`.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// The first `n` whitespace-delimited tokens joined with single spaces.
///
/// Returns every token when the text has fewer than `n`.
pub fn first_n_words(text: &str, n: usize) -> String {
    text.split_whitespace().take(n).collect::<Vec<_>>().join(" ")
}
