//! Process-wide English language resources.
//!
//! The stopword set and lemma table are built once, lazily, and shared by
//! every evaluator in the process. Construction is guarded by `OnceCell`,
//! so concurrent first use cannot build them twice.

use std::collections::{HashMap, HashSet};

use once_cell::sync::OnceCell;
use tracing::debug;

static LEXICON: OnceCell<Lexicon> = OnceCell::new();

/// Shared stopword set and lemma lookup.
pub struct Lexicon {
    stopwords: HashSet<&'static str>,
    irregular_lemmas: HashMap<&'static str, &'static str>,
}

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall",
    "can", "need", "dare", "ought", "used", "to", "of", "in", "for", "on", "with", "at", "by",
    "from", "as", "into", "through", "during", "before", "after", "above", "below", "between",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why", "how",
    "all", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not", "only",
    "own", "same", "so", "than", "too", "very", "just", "and", "but", "if", "or", "because",
    "until", "while", "what", "which", "who", "whom", "this", "that", "these", "those", "am",
    "it", "its", "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your",
    "yours", "yourself", "he", "him", "his", "himself", "she", "her", "hers", "herself", "they",
    "them", "their", "theirs", "themselves", "itself", "having", "doing", "about", "against",
    "up", "down", "out", "off", "over", "both", "any", "s", "t", "don", "now",
];

const IRREGULAR_LEMMAS: &[(&str, &str)] = &[
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("people", "person"),
    ("data", "datum"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
    ("analyses", "analysis"),
    ("bases", "basis"),
    ("hypotheses", "hypothesis"),
];

impl Lexicon {
    fn build() -> Self {
        debug!(
            stopwords = STOPWORDS.len(),
            irregular_lemmas = IRREGULAR_LEMMAS.len(),
            "Building shared lexicon"
        );
        Self {
            stopwords: STOPWORDS.iter().copied().collect(),
            irregular_lemmas: IRREGULAR_LEMMAS.iter().copied().collect(),
        }
    }

    /// Returns the process-wide lexicon, building it on first use.
    pub fn shared() -> &'static Self {
        LEXICON.get_or_init(Self::build)
    }

    /// Returns `true` if `word` (already lowercase) is a stopword.
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Reduces a lowercase word to its base (lemma) form.
    ///
    /// Irregular plurals come from a fixed table; regular plurals fall back
    /// to suffix stripping. Words of three characters or fewer are returned
    /// unchanged.
    pub fn lemma(&self, word: &str) -> String {
        if let Some(lemma) = self.irregular_lemmas.get(word) {
            return (*lemma).to_string();
        }
        if word.len() <= 3 {
            return word.to_string();
        }

        if let Some(stem) = word.strip_suffix("ies") {
            if stem.len() >= 2 {
                return format!("{stem}y");
            }
        }
        for suffix in ["ses", "xes", "zes", "ches", "shes"] {
            if let Some(stem) = word.strip_suffix(suffix) {
                // keep the consonant, drop the plural "es"
                let keep = &word[..stem.len() + suffix.len() - 2];
                return keep.to_string();
            }
        }
        if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
            return word.to_string();
        }
        if let Some(stem) = word.strip_suffix('s') {
            return stem.to_string();
        }

        word.to_string()
    }
}
