//! Rubric library crate: automated short-answer grading.
//!
//! Grades a free-text student answer against a reference answer, producing
//! a bounded numeric score plus an auditable breakdown. Three
//! interchangeable strategies share the [`Evaluator`] contract:
//!
//! - **Local pipeline** ([`LocalEvaluator`]): combines semantic, lexical,
//!   and length signals from locally loaded sentence encoders into a
//!   calibrated score, with empty-input and irrelevance short-circuits.
//! - **Remote pipeline** ([`RemoteEvaluator`]): pre-filters on local
//!   similarity, then drives an external model-serving endpoint with
//!   retry/backoff, defensive response parsing, and a deterministic
//!   length-penalty override.
//! - **Standalone filter** ([`FilterEvaluator`]): a cheap similarity gate
//!   with linear scaling and quality bands.
//!
//! # Construction
//!
//! Model resources load once at evaluator construction (construct-or-fail);
//! a constructed evaluator is immutable and safe to call concurrently.
//! [`build_evaluator`] dispatches on [`EvaluatorConfig::evaluator`]:
//!
//! ```no_run
//! use rubric::{EvaluatorConfig, Evaluator, GradingRequest, build_evaluator};
//!
//! # fn main() -> Result<(), rubric::EvaluatorError> {
//! let evaluator = build_evaluator(&EvaluatorConfig::from_env().unwrap_or_default())?;
//! let result = evaluator.evaluate(
//!     &GradingRequest::new(
//!         "Plants convert sunlight into energy",
//!         "Photosynthesis converts sunlight into chemical energy using chlorophyll",
//!     )
//!     .with_max_marks(10.0),
//! );
//! println!("{} ({})", result.final_score, result.status);
//! # Ok(())
//! # }
//! ```
//!
//! For tests and artifact-free environments, [`EvaluatorConfig::stub`] runs
//! the encoders in a deterministic stub mode.

pub mod config;
pub mod constants;
pub mod embedding;
pub mod evaluator;
pub mod llm;
pub mod scoring;
pub mod text;

pub use config::{ConfigError, EvaluatorConfig, EvaluatorKind, Thresholds, Weights};
pub use embedding::{EmbeddingError, EncoderConfig, ModelSet, SentenceEncoder, cosine_similarity};
pub use evaluator::{
    AnyEvaluator, BatchReport, BatchSummary, Breakdown, Evaluator, EvaluatorError, EvaluatorInfo,
    FilterBreakdown, FilterEvaluator, GradingRequest, GradingResult, IrrelevantBreakdown,
    LocalEvaluator, RemoteBreakdown, SignalBreakdown, Status, build_evaluator, evaluator_info,
};
pub use llm::{LlmError, RemoteEvaluator};
pub use scoring::{
    GateDecision, IrrelevanceGate, LexicalSignal, SemanticScorer, SemanticSignal, SignalError,
    length_score, lexical_scores,
};
pub use text::{concept_tokens, normalize, tokenize};
