//! Irrelevance gating.
//!
//! Two independent triggers, either sufficient to zero an answer before
//! full scoring: a primary-similarity threshold, and a coherence heuristic
//! over the concept tokens of both texts. The heuristic is deliberately
//! fail-open: any internal failure is logged and treated as *not
//! irrelevant*, so an internal bug can never spuriously zero a plausible
//! answer.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::constants::{
    COHERENCE_FLOOR, CONTRADICTION_CEILING, MAX_CONCEPT_TOKENS, NEUTRAL_CONTRADICTION,
};
use crate::embedding::{ModelSet, cosine_similarity};
use crate::text::concept_tokens;

use super::error::SignalError;

/// Outcome of the irrelevance gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateDecision {
    /// `true` if the answer should be zeroed before full scoring.
    pub irrelevant: bool,
    /// The primary similarity that informed the decision.
    pub similarity: f32,
}

/// Decides whether an answer should be zeroed before full scoring.
pub struct IrrelevanceGate {
    models: Arc<ModelSet>,
    threshold: f32,
}

impl IrrelevanceGate {
    pub fn new(models: Arc<ModelSet>, threshold: f32) -> Self {
        Self { models, threshold }
    }

    /// Checks both triggers over normalized texts.
    pub fn check(&self, student: &str, reference: &str) -> Result<GateDecision, SignalError> {
        let similarity = self.models.primary().similarity(student, reference)?;

        if similarity < self.threshold {
            debug!(
                similarity,
                threshold = self.threshold,
                "Answer below irrelevance threshold"
            );
            return Ok(GateDecision {
                irrelevant: true,
                similarity,
            });
        }

        // The coherence heuristic needs real semantic vectors; stub
        // embeddings carry none, so only the threshold trigger applies there.
        let incoherent = if self.models.primary().has_model() {
            match self.incoherent(student, reference) {
                Ok(flag) => flag,
                Err(e) => {
                    // fail-open
                    warn!(error = %e, "Coherence analysis failed, treating answer as relevant");
                    false
                }
            }
        } else {
            false
        };

        Ok(GateDecision {
            irrelevant: incoherent,
            similarity,
        })
    }

    /// Coherence heuristic: mean pairwise similarity between the two texts'
    /// concept-token embeddings, plus a contradiction probe against the
    /// refinement encoder.
    fn incoherent(&self, student: &str, reference: &str) -> Result<bool, SignalError> {
        let student_concepts = concept_tokens(student, MAX_CONCEPT_TOKENS);
        let reference_concepts = concept_tokens(reference, MAX_CONCEPT_TOKENS);

        if student_concepts.is_empty() || reference_concepts.is_empty() {
            return Ok(false);
        }

        let coherence = self.concept_coherence(&student_concepts, &reference_concepts)?;
        let contradiction = self.contradiction_likelihood(student, reference)?;

        debug!(coherence, contradiction, "Coherence analysis complete");

        Ok(coherence < COHERENCE_FLOOR || contradiction > CONTRADICTION_CEILING)
    }

    /// Mean pairwise cosine similarity between individually embedded
    /// student and reference concept tokens.
    pub fn concept_coherence(
        &self,
        student_concepts: &[String],
        reference_concepts: &[String],
    ) -> Result<f32, SignalError> {
        if student_concepts.is_empty() || reference_concepts.is_empty() {
            return Ok(0.5);
        }

        let primary = self.models.primary();
        let student_embeddings: Vec<Vec<f32>> = student_concepts
            .iter()
            .map(|token| primary.embed(token))
            .collect::<Result<_, _>>()?;
        let reference_embeddings: Vec<Vec<f32>> = reference_concepts
            .iter()
            .map(|token| primary.embed(token))
            .collect::<Result<_, _>>()?;

        let mut total = 0.0f32;
        let mut count = 0usize;
        for s in &student_embeddings {
            for r in &reference_embeddings {
                total += cosine_similarity(s, r);
                count += 1;
            }
        }

        if count == 0 {
            return Ok(0.5);
        }
        Ok(total / count as f32)
    }

    /// Contradiction likelihood via the refinement encoder's relatedness:
    /// strongly related texts are unlikely to contradict. Defaults to a
    /// neutral constant when the refinement encoder is absent.
    pub fn contradiction_likelihood(
        &self,
        student: &str,
        reference: &str,
    ) -> Result<f32, SignalError> {
        match self.models.refinement() {
            Some(refinement) => {
                let relatedness = refinement.similarity(student, reference)?;
                Ok((1.0 - relatedness).clamp(0.0, 1.0))
            }
            None => Ok(NEUTRAL_CONTRADICTION),
        }
    }

    /// Returns the configured irrelevance threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}
