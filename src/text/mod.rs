//! Text normalization for grading requests.
//!
//! [`normalize`] turns raw answer text into a canonical token sequence:
//! case-folded, punctuation-free, stopword-free, lemma-reduced. The result
//! is recomputed per call and never persisted. Empty or stopword-only input
//! normalizes to an empty string, which callers treat as the terminal
//! "empty" grading status.

pub mod lexicon;

#[cfg(test)]
mod tests;

pub use lexicon::Lexicon;

/// Normalizes raw text into a canonical, space-joined token sequence.
///
/// Pure and deterministic: the same input always yields the same output.
pub fn normalize(text: &str) -> String {
    tokenize(text).join(" ")
}

/// Normalizes raw text and returns the canonical tokens.
///
/// Tokens are lowercase, alphabetic, non-stopword lemmas, in input order.
pub fn tokenize(text: &str) -> Vec<String> {
    let lexicon = Lexicon::shared();

    text.to_lowercase()
        .split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .filter(|t| !t.is_empty() && t.chars().all(|c| c.is_alphabetic()))
        .filter(|t| !lexicon.is_stopword(t))
        .map(|t| lexicon.lemma(t))
        .collect()
}

/// Extracts the content-bearing concept tokens of a text for the
/// irrelevance gate: normalized tokens longer than two characters,
/// deduplicated in first-seen order, capped at `limit`.
pub fn concept_tokens(text: &str, limit: usize) -> Vec<String> {
    let mut seen = Vec::new();
    for token in tokenize(text) {
        if token.len() > 2 && !seen.contains(&token) {
            seen.push(token);
            if seen.len() == limit {
                break;
            }
        }
    }
    seen
}
