//! Token frequency over human messages.

use indexmap::IndexMap;
use serde::Serialize;

/// Words too common to be informative.
pub const STOP_WORDS: &[&str] = &[
    "dan", "atau", "yang", "untuk", "dari", "dengan", "pada", "dalam", "ini", "itu", "saya",
    "aku", "kami", "kita", "kamu", "anda", "dia", "mereka", "apa", "oke", "baik", "iya", "tidak",
    "nggak", "gak", "aja", "saja", "lagi", "sudah", "belum", "jadi", "bisa", "mau",
];

/// Punctuation that separates tokens, in addition to whitespace.
const SEPARATORS: &[char] = &[
    '.', ',', '!', '?', ';', ':', '(', ')', '"', '\'', '`', '[', ']', '{', '}', '\\', '/',
];

const MIN_TOKEN_CHARS: usize = 3;

/// A token and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenCount {
    pub word: String,
    pub count: u64,
}

/// Lowercase `text` and split it into informative tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS && !STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// Accumulates token counts, remembering first-seen order for tie-breaks.
#[derive(Debug, Default)]
pub struct TokenCounter {
    counts: IndexMap<String, u64>,
}

impl TokenCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_text(&mut self, text: &str) {
        for token in tokenize(text) {
            *self.counts.entry(token).or_insert(0) += 1;
        }
    }

    /// The `n` most frequent tokens; equal counts keep first-seen order.
    pub fn top(&self, n: usize) -> Vec<TokenCount> {
        let mut entries: Vec<TokenCount> = self
            .counts
            .iter()
            .map(|(word, count)| TokenCount {
                word: word.clone(),
                count: *count,
            })
            .collect();
        // Stable sort keeps insertion order among equal counts.
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries.truncate(n);
        entries
    }
}
