//! Strategy selection.
//!
//! Grading strategies form a closed, tagged set dispatched through the one
//! [`Evaluator`] contract. Selection is configuration-driven; a
//! misconfigured choice falls back to the documented default (the local
//! pipeline) at parse time rather than erroring, and strategies share no
//! state beyond the immutable model handle.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{EvaluatorConfig, EvaluatorKind};
use crate::embedding::ModelSet;
use crate::llm::RemoteEvaluator;

use super::error::EvaluatorError;
use super::filter::FilterEvaluator;
use super::local::LocalEvaluator;
use super::{Evaluator, GradingRequest, GradingResult};

/// Description of a constructed evaluator, for observability.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatorInfo {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refinement_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_model: Option<String>,
    pub is_available: bool,
}

/// The closed set of grading strategies behind one contract.
pub enum AnyEvaluator {
    /// Local multi-signal pipeline.
    Local(LocalEvaluator),
    /// Remote LLM-backed pipeline.
    Remote(RemoteEvaluator),
    /// Standalone similarity filter.
    Filter(FilterEvaluator),
}

impl AnyEvaluator {
    /// Returns the strategy's configuration name.
    pub fn kind(&self) -> EvaluatorKind {
        match self {
            AnyEvaluator::Local(_) => EvaluatorKind::Local,
            AnyEvaluator::Remote(_) => EvaluatorKind::Remote,
            AnyEvaluator::Filter(_) => EvaluatorKind::Filter,
        }
    }
}

impl Evaluator for AnyEvaluator {
    fn evaluate(&self, request: &GradingRequest) -> GradingResult {
        match self {
            AnyEvaluator::Local(evaluator) => evaluator.evaluate(request),
            AnyEvaluator::Remote(evaluator) => evaluator.evaluate(request),
            AnyEvaluator::Filter(evaluator) => evaluator.evaluate(request),
        }
    }
}

/// Builds the strategy named by `config.evaluator`.
///
/// Local strategies require the model set and fail construction when the
/// primary encoder's artifacts are missing. The remote strategy treats the
/// model set as best-effort: if local models cannot load, it proceeds
/// without the pre-filter instead of failing.
pub fn build_evaluator(config: &EvaluatorConfig) -> Result<AnyEvaluator, EvaluatorError> {
    config.validate()?;

    info!(kind = config.evaluator.as_str(), "Building evaluator");

    match config.evaluator {
        EvaluatorKind::Local => {
            let models = Arc::new(ModelSet::load(config)?);
            Ok(AnyEvaluator::Local(LocalEvaluator::new(models, config)))
        }
        EvaluatorKind::Filter => {
            let models = Arc::new(ModelSet::load(config)?);
            Ok(AnyEvaluator::Filter(FilterEvaluator::new(models, config)))
        }
        EvaluatorKind::Remote => {
            let models = match ModelSet::load(config) {
                Ok(models) => Some(Arc::new(models)),
                Err(e) => {
                    warn!(error = %e, "Local models unavailable, remote pipeline runs unfiltered");
                    None
                }
            };
            Ok(AnyEvaluator::Remote(RemoteEvaluator::connect(
                config, models,
            )))
        }
    }
}

/// Describes an evaluator built from `config` without retaining it.
pub fn evaluator_info(evaluator: &AnyEvaluator, config: &EvaluatorConfig) -> EvaluatorInfo {
    match evaluator {
        AnyEvaluator::Local(_) | AnyEvaluator::Filter(_) => EvaluatorInfo {
            kind: evaluator.kind().as_str(),
            primary_model: Some(config.primary_model.clone()),
            refinement_model: config.refinement_model.clone(),
            remote_model: None,
            is_available: true,
        },
        AnyEvaluator::Remote(remote) => EvaluatorInfo {
            kind: evaluator.kind().as_str(),
            primary_model: Some(config.primary_model.clone()),
            refinement_model: config.refinement_model.clone(),
            remote_model: Some(remote.model_name().to_string()),
            is_available: remote.is_available(),
        },
    }
}
