//! Pair-relative lexical scoring.
//!
//! The term-weighting vocabulary is built from exactly the two texts in the
//! request, so weights are relative to this answer pair rather than any
//! global corpus. Keyword score is the cosine of the two tf-idf vectors;
//! concept score is the overlap between the top-weighted reference terms
//! and the student's tokens.

use std::collections::{HashMap, HashSet};

use crate::constants::REFERENCE_KEYWORD_COUNT;

/// Lexical signal values for one answer pair.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalSignal {
    /// Cosine similarity of the pair-relative tf-idf vectors.
    pub keyword_score: f32,
    /// `|reference keywords ∩ student tokens| / |reference keywords|`.
    pub concept_score: f32,
    /// Top reference terms by tf-idf weight.
    pub reference_keywords: Vec<String>,
}

/// Computes keyword and concept-overlap scores over normalized token lists.
pub fn lexical_scores(student_tokens: &[String], reference_tokens: &[String]) -> LexicalSignal {
    let vocabulary = build_vocabulary(student_tokens, reference_tokens);
    let student_vec = tfidf_vector(student_tokens, &vocabulary);
    let reference_vec = tfidf_vector(reference_tokens, &vocabulary);

    let keyword_score = sparse_cosine(&student_vec, &reference_vec);

    let reference_keywords = top_terms(&reference_vec, REFERENCE_KEYWORD_COUNT);
    let student_set: HashSet<&String> = student_tokens.iter().collect();
    let matched = reference_keywords
        .iter()
        .filter(|term| student_set.contains(term))
        .count();
    let concept_score = matched as f32 / reference_keywords.len().max(1) as f32;

    LexicalSignal {
        keyword_score,
        concept_score,
        reference_keywords,
    }
}

/// Smoothed idf over the two-document pair, sklearn-style:
/// `ln((1 + n) / (1 + df)) + 1` with `n = 2`.
fn idf(document_frequency: usize) -> f32 {
    ((1.0 + 2.0) / (1.0 + document_frequency as f32)).ln() + 1.0
}

fn build_vocabulary(student: &[String], reference: &[String]) -> HashMap<String, f32> {
    let student_set: HashSet<&String> = student.iter().collect();
    let reference_set: HashSet<&String> = reference.iter().collect();

    student_set
        .union(&reference_set)
        .map(|term| {
            let df = usize::from(student_set.contains(*term))
                + usize::from(reference_set.contains(*term));
            ((*term).clone(), idf(df))
        })
        .collect()
}

/// L2-normalized tf-idf weights for one document.
fn tfidf_vector(tokens: &[String], vocabulary: &HashMap<String, f32>) -> HashMap<String, f32> {
    let mut counts: HashMap<&String, usize> = HashMap::new();
    for token in tokens {
        *counts.entry(token).or_insert(0) += 1;
    }

    let mut vector: HashMap<String, f32> = counts
        .into_iter()
        .filter_map(|(term, count)| {
            vocabulary
                .get(term)
                .map(|idf| (term.clone(), count as f32 * idf))
        })
        .collect();

    let norm: f32 = vector.values().map(|w| w * w).sum::<f32>().sqrt();
    if norm > 0.0 {
        for weight in vector.values_mut() {
            *weight /= norm;
        }
    }

    vector
}

fn sparse_cosine(a: &HashMap<String, f32>, b: &HashMap<String, f32>) -> f32 {
    // both vectors are already L2-normalized
    a.iter()
        .filter_map(|(term, weight)| b.get(term).map(|other| weight * other))
        .sum()
}

/// Top `n` terms by weight; ties broken by ascending term order so the
/// selection is deterministic.
fn top_terms(vector: &HashMap<String, f32>, n: usize) -> Vec<String> {
    let mut terms: Vec<(&String, f32)> = vector.iter().map(|(t, w)| (t, *w)).collect();
    terms.sort_by(|(term_a, weight_a), (term_b, weight_b)| {
        weight_b
            .partial_cmp(weight_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| term_a.cmp(term_b))
    });

    terms.into_iter().take(n).map(|(t, _)| t.clone()).collect()
}
