//! Semantic similarity blending.

use std::sync::Arc;

use tracing::debug;

use crate::embedding::ModelSet;

use super::error::SignalError;

/// Semantic signal values for one answer pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SemanticSignal {
    /// Primary (bi-encoder) cosine similarity.
    pub bi_score: f32,
    /// Refinement cosine similarity (equals `bi_score` when the refinement
    /// encoder is not loaded).
    pub cross_score: f32,
    /// Blended similarity used by the aggregator.
    pub blended: f32,
}

/// Blends primary and refinement cosine similarity.
pub struct SemanticScorer {
    models: Arc<ModelSet>,
    blend: (f32, f32),
}

impl SemanticScorer {
    pub fn new(models: Arc<ModelSet>, blend: (f32, f32)) -> Self {
        Self { models, blend }
    }

    /// Computes the semantic signal over normalized texts.
    ///
    /// When both encoders are loaded, the blend is
    /// `blend.0 · primary + blend.1 · refinement`; with only the primary it
    /// is the primary score alone. A refinement inference failure falls
    /// back to the primary score rather than failing the request.
    pub fn score(&self, student: &str, reference: &str) -> Result<SemanticSignal, SignalError> {
        let bi_score = self.models.primary().similarity(student, reference)?;

        let (cross_score, blended) = match self.models.refinement() {
            Some(refinement) => match refinement.similarity(student, reference) {
                Ok(cross) => {
                    let (w_bi, w_cross) = self.blend;
                    (cross, w_bi * bi_score + w_cross * cross)
                }
                Err(e) => {
                    debug!(error = %e, "Refinement similarity failed, using primary score");
                    (bi_score, bi_score)
                }
            },
            None => (bi_score, bi_score),
        };

        Ok(SemanticSignal {
            bi_score,
            cross_score,
            blended,
        })
    }
}
