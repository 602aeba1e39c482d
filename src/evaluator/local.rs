//! The local multi-signal grading pipeline.

use std::sync::Arc;

use tracing::{debug, error};

use crate::config::{EvaluatorConfig, Weights};
use crate::embedding::ModelSet;
use crate::scoring::{IrrelevanceGate, SemanticScorer, length_score, lexical_scores};
use crate::text::tokenize;

use super::error::EvaluatorError;
use super::{
    Breakdown, Evaluator, GradingRequest, GradingResult, IrrelevantBreakdown, SignalBreakdown,
    Status,
};

/// Combines length, semantic, keyword, and concept signals into a
/// calibrated score, with empty-input and irrelevance short-circuits.
pub struct LocalEvaluator {
    gate: IrrelevanceGate,
    semantic: SemanticScorer,
    weights: Weights,
    min_length_ratio: f32,
}

impl LocalEvaluator {
    /// Builds the pipeline over an already-loaded model set.
    pub fn new(models: Arc<ModelSet>, config: &EvaluatorConfig) -> Self {
        Self {
            gate: IrrelevanceGate::new(Arc::clone(&models), config.thresholds.irrelevance),
            semantic: SemanticScorer::new(models, config.semantic_blend),
            weights: config.weights,
            min_length_ratio: config.thresholds.min_length_ratio,
        }
    }

    /// Validates the config, loads the model set, and builds the pipeline.
    pub fn from_config(config: &EvaluatorConfig) -> Result<Self, EvaluatorError> {
        config.validate()?;
        let models = Arc::new(ModelSet::load(config)?);
        Ok(Self::new(models, config))
    }
}

impl Evaluator for LocalEvaluator {
    fn evaluate(&self, request: &GradingRequest) -> GradingResult {
        let student_tokens = tokenize(&request.student_answer);
        let reference_tokens = tokenize(&request.reference_answer);

        if student_tokens.is_empty() {
            return GradingResult::zero(
                Status::Empty,
                "Empty or stopword-only answer after cleaning",
            );
        }

        let student = student_tokens.join(" ");
        let reference = reference_tokens.join(" ");

        let decision = match self.gate.check(&student, &reference) {
            Ok(decision) => decision,
            Err(e) => {
                error!(error = %e, "Irrelevance gate failed");
                return GradingResult::zero(
                    Status::Error,
                    format!("System error during evaluation: {e}"),
                );
            }
        };
        if decision.irrelevant {
            return GradingResult {
                final_score: 0.0,
                status: Status::Irrelevant,
                breakdown: Breakdown::Irrelevant(IrrelevantBreakdown {
                    irrelevant: true,
                    bi_encoder_similarity: decision.similarity,
                }),
                explanation: format!(
                    "Answer judged irrelevant to the reference (similarity {:.4})",
                    decision.similarity
                ),
            };
        }

        let length = length_score(
            student_tokens.len(),
            reference_tokens.len(),
            self.min_length_ratio,
        );

        let semantic = match self.semantic.score(&student, &reference) {
            Ok(signal) => signal,
            Err(e) => {
                error!(error = %e, "Semantic scoring failed");
                return GradingResult::zero(
                    Status::Error,
                    format!("System error during evaluation: {e}"),
                );
            }
        };

        let lexical = lexical_scores(&student_tokens, &reference_tokens);

        let combined = self.weights.length * length
            + self.weights.semantic * semantic.blended
            + self.weights.keyword * lexical.keyword_score
            + self.weights.concept * lexical.concept_score;
        let combined = combined.clamp(0.0, 1.0);
        let final_score = combined * request.max_marks;

        debug!(
            length,
            semantic_final = semantic.blended,
            keyword = lexical.keyword_score,
            concept = lexical.concept_score,
            final_score,
            "Local pipeline scored answer"
        );

        GradingResult {
            final_score,
            status: Status::Ok,
            breakdown: Breakdown::Signals(SignalBreakdown {
                length_score: length,
                semantic_bi: semantic.bi_score,
                cross_encoder: semantic.cross_score,
                semantic_final: semantic.blended,
                keyword_score: lexical.keyword_score,
                concept_score: lexical.concept_score,
                reference_keywords: lexical.reference_keywords,
            }),
            explanation: format!(
                "Scored {:.2} of {} from weighted length, semantic, keyword, and concept analysis",
                final_score, request.max_marks
            ),
        }
    }
}
