//! The grading contract and its interchangeable strategies.
//!
//! Every strategy implements [`Evaluator`]: two answer strings in, a
//! [`GradingResult`] out. Strategies never panic on a request and never
//! return a score outside `[0, max_marks]`; failures surface as
//! [`Status::Error`] results.

pub mod error;
/// Standalone similarity filter.
pub mod filter;
/// Local multi-signal pipeline.
pub mod local;
/// Strategy selection.
pub mod selector;


pub use error::EvaluatorError;
pub use filter::{BatchReport, BatchSummary, FilterEvaluator};
pub use local::LocalEvaluator;
pub use selector::{AnyEvaluator, EvaluatorInfo, build_evaluator, evaluator_info};

use serde::Serialize;

use crate::constants::DEFAULT_MAX_MARKS;

/// One grading request. Immutable per call.
#[derive(Debug, Clone)]
pub struct GradingRequest {
    /// The student's answer (may be empty).
    pub student_answer: String,
    /// The reference answer.
    pub reference_answer: String,
    /// The exam question, when known.
    pub question: Option<String>,
    /// Maximum marks for the question. Always positive.
    pub max_marks: f32,
}

impl GradingRequest {
    /// Creates a request graded out of the default maximum marks.
    pub fn new(student_answer: impl Into<String>, reference_answer: impl Into<String>) -> Self {
        Self {
            student_answer: student_answer.into(),
            reference_answer: reference_answer.into(),
            question: None,
            max_marks: DEFAULT_MAX_MARKS,
        }
    }

    /// Attaches the exam question text.
    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    /// Replaces the maximum marks.
    ///
    /// # Panics
    ///
    /// Panics if `max_marks` is not a positive finite number.
    pub fn with_max_marks(mut self, max_marks: f32) -> Self {
        assert!(
            max_marks.is_finite() && max_marks > 0.0,
            "max_marks must be a positive finite number"
        );
        self.max_marks = max_marks;
        self
    }
}

/// Terminal status of a grading call. Exactly one value per result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Scored normally.
    Ok,
    /// Zeroed by the irrelevance gate.
    Irrelevant,
    /// Student answer empty after normalization.
    Empty,
    /// Zeroed by a similarity filter before scoring.
    Filtered,
    /// Scoring failed; no marks were awarded.
    Error,
}

impl Status {
    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::Irrelevant => "irrelevant",
            Status::Empty => "empty",
            Status::Filtered => "filtered",
            Status::Error => "error",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signal values produced by the local pipeline.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignalBreakdown {
    pub length_score: f32,
    pub semantic_bi: f32,
    pub cross_encoder: f32,
    pub semantic_final: f32,
    pub keyword_score: f32,
    pub concept_score: f32,
    pub reference_keywords: Vec<String>,
}

/// Breakdown retained when the irrelevance gate zeroes an answer.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IrrelevantBreakdown {
    pub irrelevant: bool,
    pub bi_encoder_similarity: f32,
}

/// Breakdown produced by the remote pipeline.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteBreakdown {
    pub llm_score: f32,
    pub model_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    pub filter_score: f32,
    pub filter_passed: bool,
    pub timestamp: String,
}

/// Breakdown produced by the standalone filter.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterBreakdown {
    pub raw_score: f32,
    pub filtered: bool,
    pub reason: String,
    pub threshold: f32,
    pub category: String,
    pub model_name: String,
}

/// Strategy-specific grading breakdown. Never mutated after being returned.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Breakdown {
    /// No breakdown (empty input or a failure before any signal ran).
    None,
    /// Gate short-circuit.
    Irrelevant(IrrelevantBreakdown),
    /// Full local signal set.
    Signals(SignalBreakdown),
    /// Remote pipeline fields.
    Remote(RemoteBreakdown),
    /// Standalone filter fields.
    Filter(FilterBreakdown),
}

impl Breakdown {
    /// Returns the local signal set, if this is a local-pipeline breakdown.
    pub fn signals(&self) -> Option<&SignalBreakdown> {
        match self {
            Breakdown::Signals(signals) => Some(signals),
            _ => None,
        }
    }

    /// Returns the remote fields, if this is a remote-pipeline breakdown.
    pub fn remote(&self) -> Option<&RemoteBreakdown> {
        match self {
            Breakdown::Remote(remote) => Some(remote),
            _ => None,
        }
    }

    /// Returns the filter fields, if this is a filter breakdown.
    pub fn filter(&self) -> Option<&FilterBreakdown> {
        match self {
            Breakdown::Filter(filter) => Some(filter),
            _ => None,
        }
    }
}

/// Outcome of one grading call.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GradingResult {
    /// Final score in `[0, max_marks]`.
    pub final_score: f32,
    /// Terminal status.
    pub status: Status,
    /// Strategy-specific signal breakdown.
    pub breakdown: Breakdown,
    /// Human-readable account of the decision.
    pub explanation: String,
}

impl GradingResult {
    /// A zero-score result with the given status and explanation.
    pub fn zero(status: Status, explanation: impl Into<String>) -> Self {
        Self {
            final_score: 0.0,
            status,
            breakdown: Breakdown::None,
            explanation: explanation.into(),
        }
    }

    /// Returns `true` if the answer was scored normally.
    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}

/// The grading contract shared by all strategies.
///
/// `evaluate` is read-only and safe to call concurrently; all model
/// resources are loaded at construction.
pub trait Evaluator: Send + Sync {
    /// Grades one request. Never panics; failures become
    /// [`Status::Error`] results.
    fn evaluate(&self, request: &GradingRequest) -> GradingResult;
}
