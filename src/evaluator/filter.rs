//! The standalone similarity filter.
//!
//! A cheap, model-backed relevance gate over raw answer text: below the
//! quality threshold the answer is forced to zero; above it the raw
//! similarity scales linearly to the maximum marks. The quality band is
//! observability only and never affects the numeric score.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error};

use crate::config::EvaluatorConfig;
use crate::embedding::ModelSet;

use super::error::EvaluatorError;
use super::{Breakdown, Evaluator, FilterBreakdown, GradingRequest, GradingResult, Status};

/// Aggregate view of a batch evaluation.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total_questions: usize,
    pub filtered_answers: usize,
    pub average_score: f32,
    pub total_score: f32,
    pub threshold: f32,
}

/// Per-request results plus the batch summary.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub results: Vec<GradingResult>,
    pub summary: BatchSummary,
}

/// Similarity filter usable on its own or as the remote pipeline's gate.
pub struct FilterEvaluator {
    models: Arc<ModelSet>,
    threshold: f32,
}

impl FilterEvaluator {
    /// Builds the filter over an already-loaded model set.
    pub fn new(models: Arc<ModelSet>, config: &EvaluatorConfig) -> Self {
        Self {
            models,
            threshold: config.thresholds.quality,
        }
    }

    /// Validates the config, loads the model set, and builds the filter.
    pub fn from_config(config: &EvaluatorConfig) -> Result<Self, EvaluatorError> {
        config.validate()?;
        let models = Arc::new(ModelSet::load(config)?);
        Ok(Self::new(models, config))
    }

    /// Returns the configured similarity threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Returns the backing model's display name.
    pub fn model_name(&self) -> &str {
        self.models.primary().name()
    }

    /// Evaluates each request and summarizes the batch.
    pub fn evaluate_batch(&self, requests: &[GradingRequest]) -> BatchReport {
        let results: Vec<GradingResult> = requests.iter().map(|r| self.evaluate(r)).collect();

        let filtered_answers = results
            .iter()
            .filter(|r| matches!(r.status, Status::Filtered | Status::Empty))
            .count();
        let total_score: f32 = results.iter().map(|r| r.final_score).sum();
        let average_score = if results.is_empty() {
            0.0
        } else {
            total_score / results.len() as f32
        };

        BatchReport {
            summary: BatchSummary {
                total_questions: results.len(),
                filtered_answers,
                average_score,
                total_score,
                threshold: self.threshold,
            },
            results,
        }
    }

    fn quality_category(raw_score: f32, filtered: bool) -> &'static str {
        if filtered {
            "Filtered (Irrelevant)"
        } else if raw_score >= 0.8 {
            "Excellent"
        } else if raw_score >= 0.6 {
            "Good"
        } else if raw_score >= 0.4 {
            "Fair"
        } else {
            "Poor"
        }
    }

    fn breakdown(&self, raw_score: f32, filtered: bool, reason: String, category: &str) -> Breakdown {
        Breakdown::Filter(FilterBreakdown {
            raw_score,
            filtered,
            reason,
            threshold: self.threshold,
            category: category.to_string(),
            model_name: self.model_name().to_string(),
        })
    }
}

impl Evaluator for FilterEvaluator {
    fn evaluate(&self, request: &GradingRequest) -> GradingResult {
        if request.student_answer.trim().is_empty() {
            return GradingResult {
                final_score: 0.0,
                status: Status::Empty,
                breakdown: self.breakdown(0.0, true, "Empty answer".to_string(), "Filtered"),
                explanation: "No answer provided".to_string(),
            };
        }

        let raw_score = match self
            .models
            .primary()
            .similarity(&request.student_answer, &request.reference_answer)
        {
            Ok(score) => score,
            Err(e) => {
                error!(error = %e, "Filter similarity failed");
                return GradingResult::zero(
                    Status::Error,
                    format!("System error during evaluation: {e}"),
                );
            }
        };

        debug!(
            raw_score,
            threshold = self.threshold,
            "Filter computed similarity"
        );

        if raw_score < self.threshold {
            let reason = format!("Score {raw_score:.4} below threshold {}", self.threshold);
            return GradingResult {
                final_score: 0.0,
                status: Status::Filtered,
                breakdown: self.breakdown(
                    raw_score,
                    true,
                    reason.clone(),
                    Self::quality_category(raw_score, true),
                ),
                explanation: reason,
            };
        }

        let final_score = (raw_score * request.max_marks).clamp(0.0, request.max_marks);
        let category = Self::quality_category(raw_score, false);

        GradingResult {
            final_score,
            status: Status::Ok,
            breakdown: self.breakdown(raw_score, false, "Passed threshold".to_string(), category),
            explanation: format!("{category}: similarity {raw_score:.4} scaled to marks"),
        }
    }
}
