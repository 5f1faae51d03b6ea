//! Word-frequency analysis over note text.
//!
//! # Responsibility
//! - Tokenize note text and count alphabetic words.
//! - Expose the analyzer seam the note service is constructed with.
//!
//! # Invariants
//! - Pure computation: no I/O, no shared mutable state.
//! - Counting is case-sensitive; `Note` and `note` are distinct words.
//! - Tokens containing any non-alphabetic character are dropped whole.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static WORD_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\p{Alphabetic}+$").expect("valid word token regex"));

/// Analyzer seam for deriving word statistics from note text.
///
/// The note service holds an implementation and never inspects text itself.
pub trait TextAnalyzer {
    /// Returns per-word occurrence counts for `text`.
    fn analyze(&self, text: &str) -> BTreeMap<String, u64>;
}

/// Default analyzer: whitespace tokenization with alphabetic-only words.
#[derive(Debug, Default, Clone, Copy)]
pub struct WordFrequencyAnalyzer;

impl TextAnalyzer for WordFrequencyAnalyzer {
    fn analyze(&self, text: &str) -> BTreeMap<String, u64> {
        word_frequencies(text)
    }
}

/// Counts word occurrences in `text`.
///
/// Rules:
/// - tokens are maximal runs between whitespace;
/// - a token counts only when every character is alphabetic, so `test123`
///   contributes nothing rather than a trimmed `test`;
/// - grouping is by exact value, case-sensitive.
///
/// Empty, all-whitespace and symbols-only input yield an empty map.
pub fn word_frequencies(text: &str) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for token in text.split_whitespace() {
        if !WORD_TOKEN_RE.is_match(token) {
            continue;
        }
        *counts.entry(token.to_string()).or_insert(0) += 1;
    }

    counts
}

/// Flattens a frequency map into the ordered boundary form.
///
/// Entries are sorted by key, descending lexicographically. Keys are unique,
/// so there are no ties to break.
pub fn into_sorted_entries(counts: BTreeMap<String, u64>) -> Vec<(String, u64)> {
    counts.into_iter().rev().collect()
}
